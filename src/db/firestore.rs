// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Everything lives under the user's profile document:
//! - `users/{uid}` (profile)
//! - `users/{uid}/workouts/{id}`
//! - `users/{uid}/app_data/{challenges_my | challenges_climbing |
//!   challenges_distance | badges | trophies}`

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::db::{app_data, collections};
use crate::error::AppError;
use crate::models::{
    ChallengeInstance, ChallengeKind, ChallengeTemplate, Profile, Trophy, UserData, Workout,
};

/// Wrapper for list-valued app data documents.
#[derive(Debug, Serialize, Deserialize)]
struct ListDocument<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BadgesDocument {
    #[serde(default)]
    unlocked: Vec<String>,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator takes an unauthenticated connection.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Path of the user's profile document, parent of all their data.
    fn user_path(&self, user_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Workout Operations ──────────────────────────────────────

    /// All workouts for a user, newest first.
    pub async fn get_workouts(&self, user_id: &str) -> Result<Vec<Workout>, AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .parent(&parent)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a new workout under a freshly assigned document id.
    ///
    /// The record's own (provisional) id is replaced; the assigned id is returned.
    pub async fn add_workout(&self, user_id: &str, workout: &Workout) -> Result<String, AppError> {
        let document_id = uuid::Uuid::new_v4().simple().to_string();
        let stored = Workout {
            id: document_id.clone(),
            ..workout.clone()
        };
        self.set_workout(user_id, &stored).await?;

        tracing::debug!(user_id, workout_id = %document_id, "Workout stored");
        Ok(document_id)
    }

    /// Create or overwrite a workout document.
    pub async fn set_workout(&self, user_id: &str, workout: &Workout) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WORKOUTS)
            .document_id(&workout.id)
            .parent(&parent)
            .object(workout)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn delete_workout(&self, user_id: &str, workout_id: &str) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WORKOUTS)
            .document_id(workout_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(user_id, workout_id, "Workout deleted from store");
        Ok(())
    }

    // ─── App Data Operations ─────────────────────────────────────

    async fn get_app_doc<T>(&self, user_id: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::APP_DATA)
            .parent(&parent)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_app_doc<T>(&self, user_id: &str, doc_id: &str, value: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let parent = self.user_path(user_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::APP_DATA)
            .document_id(doc_id)
            .parent(&parent)
            .object(value)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_list<T>(&self, user_id: &str, doc_id: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        Ok(self
            .get_app_doc::<ListDocument<T>>(user_id, doc_id)
            .await?
            .map(|doc| doc.list)
            .unwrap_or_default())
    }

    async fn set_list<T>(&self, user_id: &str, doc_id: &str, list: &[T]) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Clone + Sync + Send,
    {
        let doc = ListDocument {
            list: list.to_vec(),
        };
        self.set_app_doc(user_id, doc_id, &doc).await
    }

    pub async fn get_active_challenges(
        &self,
        user_id: &str,
    ) -> Result<Vec<ChallengeInstance>, AppError> {
        self.get_list(user_id, app_data::ACTIVE_CHALLENGES).await
    }

    pub async fn set_active_challenges(
        &self,
        user_id: &str,
        challenges: &[ChallengeInstance],
    ) -> Result<(), AppError> {
        self.set_list(user_id, app_data::ACTIVE_CHALLENGES, challenges)
            .await
    }

    pub async fn get_custom_templates(
        &self,
        user_id: &str,
        kind: ChallengeKind,
    ) -> Result<Vec<ChallengeTemplate>, AppError> {
        self.get_list(user_id, custom_templates_doc(kind)).await
    }

    pub async fn set_custom_templates(
        &self,
        user_id: &str,
        kind: ChallengeKind,
        templates: &[ChallengeTemplate],
    ) -> Result<(), AppError> {
        self.set_list(user_id, custom_templates_doc(kind), templates)
            .await
    }

    pub async fn get_unlocked_badges(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        Ok(self
            .get_app_doc::<BadgesDocument>(user_id, app_data::BADGES)
            .await?
            .unwrap_or_default()
            .unlocked)
    }

    pub async fn set_unlocked_badges(
        &self,
        user_id: &str,
        badge_ids: &[String],
    ) -> Result<(), AppError> {
        let doc = BadgesDocument {
            unlocked: badge_ids.to_vec(),
        };
        self.set_app_doc(user_id, app_data::BADGES, &doc).await
    }

    pub async fn get_trophies(&self, user_id: &str) -> Result<Vec<Trophy>, AppError> {
        self.get_list(user_id, app_data::TROPHIES).await
    }

    pub async fn set_trophies(&self, user_id: &str, trophies: &[Trophy]) -> Result<(), AppError> {
        self.set_list(user_id, app_data::TROPHIES, trophies).await
    }

    // ─── Snapshot ────────────────────────────────────────────────

    /// Load everything the user owns into one in-memory snapshot.
    pub async fn load_user_data(&self, user_id: &str) -> Result<UserData, AppError> {
        let (profile, workouts, challenges, custom_climbing, custom_distance, badges, trophies) =
            tokio::try_join!(
                self.get_profile(user_id),
                self.get_workouts(user_id),
                self.get_active_challenges(user_id),
                self.get_custom_templates(user_id, ChallengeKind::Climbing),
                self.get_custom_templates(user_id, ChallengeKind::Distance),
                self.get_unlocked_badges(user_id),
                self.get_trophies(user_id),
            )?;

        tracing::debug!(
            user_id,
            workouts = workouts.len(),
            challenges = challenges.len(),
            trophies = trophies.len(),
            "Loaded user data"
        );

        Ok(UserData {
            profile: profile.unwrap_or_default(),
            workouts,
            challenges,
            custom_climbing,
            custom_distance,
            unlocked_badges: badges.into_iter().collect(),
            trophies,
        })
    }
}

fn custom_templates_doc(kind: ChallengeKind) -> &'static str {
    match kind {
        ChallengeKind::Climbing => app_data::CUSTOM_CLIMBING,
        ChallengeKind::Distance => app_data::CUSTOM_DISTANCE,
    }
}
