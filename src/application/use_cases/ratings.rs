//! Rating submission and the admin-side aggregation.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::rating::UserRating,
};

#[async_trait]
pub trait RatingRepo: Send + Sync {
    async fn create(&self, user_id: Uuid, stars: i16, comment: Option<String>)
        -> AppResult<UserRating>;
    async fn list_all(&self) -> AppResult<Vec<UserRating>>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RatingSummary {
    /// Row counts indexed by star value 0 through 5.
    pub histogram: [i64; 6],
    pub count: i64,
    pub average: f64,
    /// `average / 5 * 100`, a 0-100 satisfaction score.
    pub percentage: f64,
}

pub fn summarize(ratings: &[UserRating]) -> RatingSummary {
    let mut histogram = [0i64; 6];
    let mut sum = 0i64;
    for rating in ratings {
        histogram[rating.stars.clamp(0, 5) as usize] += 1;
        sum += rating.stars as i64;
    }
    let count = ratings.len() as i64;
    let average = if count == 0 { 0.0 } else { sum as f64 / count as f64 };
    RatingSummary {
        histogram,
        count,
        average,
        percentage: average / 5.0 * 100.0,
    }
}

#[derive(Clone)]
pub struct RatingUseCases {
    repo: Arc<dyn RatingRepo>,
}

impl RatingUseCases {
    pub fn new(repo: Arc<dyn RatingRepo>) -> Self {
        Self { repo }
    }

    pub async fn submit(
        &self,
        user_id: Uuid,
        stars: i16,
        comment: Option<String>,
    ) -> AppResult<UserRating> {
        if !(0..=5).contains(&stars) {
            return Err(AppError::InvalidInput(
                "Rating must be between 0 and 5 stars".into(),
            ));
        }
        self.repo.create(user_id, stars, comment).await
    }

    pub async fn summary(&self) -> AppResult<RatingSummary> {
        let ratings = self.repo.list_all().await?;
        Ok(summarize(&ratings))
    }
}
