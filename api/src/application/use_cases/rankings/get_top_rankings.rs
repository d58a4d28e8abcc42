use crate::application::error::ServiceResult;
use crate::application::ports::ranking_store::RankingStore;
use crate::domain::ranking::ranking::{RankingEntry, RankingType};

pub const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

pub struct GetTopRankings<'a, S: RankingStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: RankingStore + ?Sized> GetTopRankings<'a, S> {
    pub async fn execute(
        &self,
        kind: RankingType,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<RankingEntry>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let rows = self.store.top(kind, limit).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, (concert_id, score))| RankingEntry {
                rank: i + 1,
                concert_id,
                score,
                ranking_type: kind,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryRankingStore;

    #[tokio::test]
    async fn ranks_are_one_based_and_descending() {
        let store = MemoryRankingStore::default();
        for (id, score) in [(1, 5.0), (2, 50.0), (3, 20.0)] {
            store
                .set_score(RankingType::Popularity, id, score)
                .await
                .unwrap();
        }
        let uc = GetTopRankings { store: &store };
        let top = uc.execute(RankingType::Popularity, Some(2)).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].rank, top[0].concert_id), (1, 2));
        assert_eq!((top[1].rank, top[1].concert_id), (2, 3));
        assert!(uc
            .execute(RankingType::SoldoutSpeed, None)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            uc.execute(RankingType::Popularity, Some(0)).await.unwrap().len(),
            1
        );
    }
}
