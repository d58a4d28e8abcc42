pub mod data_platform_reqwest;
