//! Badge catalog entries, unlock rules, and earned-badge facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::UserId;
use super::projection::BalanceProjection;

/// Maximum accepted length for a badge name.
pub const BADGE_NAME_MAX: usize = 64;

/// Unlock predicate evaluated against a projection snapshot.
///
/// Rules are deliberately simple threshold checks; evaluating one never
/// mutates state, so repeated evaluation is harmless and the engine's
/// exactly-once award discipline comes from `UserBadge` uniqueness instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockRule {
    /// Unlocks once the chip balance reaches the threshold.
    BalanceAtLeast {
        /// Minimum balance required.
        threshold: i64,
    },
    /// Unlocks once the credited referral count reaches the threshold.
    ReferralCountAtLeast {
        /// Minimum referral count required.
        threshold: u32,
    },
    /// Unlocks once the approved prompt count reaches the threshold.
    PromptsApprovedAtLeast {
        /// Minimum approved prompt count required.
        threshold: u32,
    },
}

impl UnlockRule {
    /// Evaluate the rule against one immutable projection snapshot.
    pub fn is_met(&self, projection: &BalanceProjection) -> bool {
        match *self {
            Self::BalanceAtLeast { threshold } => projection.balance() >= threshold,
            Self::ReferralCountAtLeast { threshold } => projection.referral_count() >= threshold,
            Self::PromptsApprovedAtLeast { threshold } => {
                projection.prompts_approved() >= threshold
            }
        }
    }
}

/// Validation errors raised while constructing a [`BadgeDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadgeValidationError {
    /// The badge name was blank.
    #[error("badge name must not be empty")]
    EmptyName,
    /// The badge name exceeded the length cap.
    #[error("badge name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// The badge icon was blank.
    #[error("badge icon must not be empty")]
    EmptyIcon,
}

/// Unvalidated badge fields, as received from admin tooling or storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinitionDraft {
    /// Stable badge identifier.
    pub badge_id: Uuid,
    /// Display name.
    pub name: String,
    /// Longer description shown in the catalog.
    pub description: String,
    /// Icon identifier rendered by clients.
    pub icon: String,
    /// Chips credited when the badge unlocks; zero means purely cosmetic.
    pub chips_reward: u32,
    /// Predicate deciding when the badge unlocks.
    pub unlock_rule: UnlockRule,
}

/// Static catalog entry describing one badge.
///
/// Created and edited only by admin actors; the rule engine treats the
/// catalog as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BadgeDefinitionDraft", into = "BadgeDefinitionDraft")]
pub struct BadgeDefinition {
    badge_id: Uuid,
    name: String,
    description: String,
    icon: String,
    chips_reward: u32,
    unlock_rule: UnlockRule,
}

impl BadgeDefinition {
    /// Validate and construct a badge definition.
    ///
    /// # Errors
    ///
    /// Returns a [`BadgeValidationError`] when the name or icon fail
    /// validation.
    pub fn new(draft: BadgeDefinitionDraft) -> Result<Self, BadgeValidationError> {
        let BadgeDefinitionDraft {
            badge_id,
            name,
            description,
            icon,
            chips_reward,
            unlock_rule,
        } = draft;

        if name.trim().is_empty() {
            return Err(BadgeValidationError::EmptyName);
        }
        if name.chars().count() > BADGE_NAME_MAX {
            return Err(BadgeValidationError::NameTooLong {
                max: BADGE_NAME_MAX,
            });
        }
        if icon.trim().is_empty() {
            return Err(BadgeValidationError::EmptyIcon);
        }

        Ok(Self {
            badge_id,
            name,
            description,
            icon,
            chips_reward,
            unlock_rule,
        })
    }

    /// Stable badge identifier.
    pub fn badge_id(&self) -> Uuid {
        self.badge_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Longer description shown in the catalog.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Icon identifier rendered by clients.
    pub fn icon(&self) -> &str {
        self.icon.as_str()
    }

    /// Chips credited when the badge unlocks.
    pub fn chips_reward(&self) -> u32 {
        self.chips_reward
    }

    /// Predicate deciding when the badge unlocks.
    pub fn unlock_rule(&self) -> UnlockRule {
        self.unlock_rule
    }
}

impl From<BadgeDefinition> for BadgeDefinitionDraft {
    fn from(value: BadgeDefinition) -> Self {
        Self {
            badge_id: value.badge_id,
            name: value.name,
            description: value.description,
            icon: value.icon,
            chips_reward: value.chips_reward,
            unlock_rule: value.unlock_rule,
        }
    }
}

impl TryFrom<BadgeDefinitionDraft> for BadgeDefinition {
    type Error = BadgeValidationError;

    fn try_from(value: BadgeDefinitionDraft) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Earned-badge fact: at most one per `(user, badge)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    /// The user who earned the badge.
    pub user_id: UserId,
    /// The earned badge.
    pub badge_id: Uuid,
    /// When the badge was earned.
    pub earned_at: DateTime<Utc>,
}
