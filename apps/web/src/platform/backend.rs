//! Registration and application submission.
//!
//! There is no user service behind the landing page yet, so the default
//! `SimulatedBackend` resolves after a fixed delay the way the real calls are
//! expected to. `PlatformFacade` holds an `Arc<dyn PlatformBackend>`, swapped
//! for a fake in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching_client::ApiError;
use crate::models::job::JobPosting;
use crate::models::user::UserProfile;
use crate::platform::registration::ValidRegistration;

pub const REGISTRATION_DELAY: Duration = Duration::from_millis(1500);
pub const APPLICATION_DELAY: Duration = Duration::from_millis(2000);
const SIMULATED_OPTIMIZATION_SCORE: u32 = 92;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationReceipt {
    pub accepted: bool,
    pub application_id: Uuid,
    pub message: String,
    pub optimization_score: u32,
}

#[async_trait]
pub trait PlatformBackend: Send + Sync {
    async fn register_user(&self, registration: &ValidRegistration)
        -> Result<UserProfile, ApiError>;

    async fn submit_application(&self, job: &JobPosting) -> Result<ApplicationReceipt, ApiError>;
}

#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    pub registration_delay: Duration,
    pub application_delay: Duration,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            registration_delay: REGISTRATION_DELAY,
            application_delay: APPLICATION_DELAY,
        }
    }
}

#[async_trait]
impl PlatformBackend for SimulatedBackend {
    async fn register_user(
        &self,
        registration: &ValidRegistration,
    ) -> Result<UserProfile, ApiError> {
        tokio::time::sleep(self.registration_delay).await;

        Ok(UserProfile {
            id: Uuid::new_v4(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            province: registration.province.clone(),
            plan: registration.plan,
            join_date: Utc::now(),
        })
    }

    async fn submit_application(&self, job: &JobPosting) -> Result<ApplicationReceipt, ApiError> {
        tokio::time::sleep(self.application_delay).await;

        Ok(ApplicationReceipt {
            accepted: true,
            application_id: Uuid::new_v4(),
            message: format!("AI-optimized application submitted for {}", job.title),
            optimization_score: SIMULATED_OPTIMIZATION_SCORE,
        })
    }
}
