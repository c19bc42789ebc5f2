use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Why a pit is not currently eligible for automatic archival.
///
/// `None` in [`PitRecord::archive_mode`] means the pit is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveMode {
    /// Archived by its owner or a counselor.
    Manual,
    /// Marked inactive by a counselor.
    Inactive,
    /// Archived because the owner left the server.
    Leave,
    /// Archived by the auto-archival engine after the inactivity window ran out.
    Automatic,
}

impl std::fmt::Display for ArchiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArchiveMode::Manual => "manual",
            ArchiveMode::Inactive => "inactive",
            ArchiveMode::Leave => "leave",
            ArchiveMode::Automatic => "automatic",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ArchiveMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "manual" => Ok(ArchiveMode::Manual),
            "inactive" => Ok(ArchiveMode::Inactive),
            "leave" => Ok(ArchiveMode::Leave),
            "automatic" => Ok(ArchiveMode::Automatic),
            other => Err(format!("unknown archive mode: {other}")),
        }
    }
}

/// Closed set of allowed inactivity windows, persisted as integer seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveDuration {
    OneDay,
    #[default]
    ThreeDays,
    OneWeek,
    FourWeeks,
}

impl ArchiveDuration {
    pub const fn as_secs(self) -> i64 {
        match self {
            ArchiveDuration::OneDay => 86_400,
            ArchiveDuration::ThreeDays => 259_200,
            ArchiveDuration::OneWeek => 604_800,
            ArchiveDuration::FourWeeks => 2_419_200,
        }
    }

    /// Inverse of [`as_secs`](Self::as_secs). `None` for values outside the
    /// closed set — the store only ever writes the four known windows.
    pub fn from_secs(secs: i64) -> Option<Self> {
        match secs {
            86_400 => Some(ArchiveDuration::OneDay),
            259_200 => Some(ArchiveDuration::ThreeDays),
            604_800 => Some(ArchiveDuration::OneWeek),
            2_419_200 => Some(ArchiveDuration::FourWeeks),
            _ => None,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::seconds(self.as_secs())
    }
}

impl std::fmt::Display for ArchiveDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ArchiveDuration::OneDay => "24h",
            ArchiveDuration::ThreeDays => "3d",
            ArchiveDuration::OneWeek => "7d",
            ArchiveDuration::FourWeeks => "28d",
        };
        write!(f, "{s}")
    }
}

/// A persisted pit record — one per managed channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitRecord {
    /// Id of the managed channel. Primary key.
    pub pit_id: u64,
    /// Id of the owning member. Unique — one active pit per member.
    pub pit_owner: u64,
    /// Inactivity window after which the pit becomes eligible for archival.
    pub archive_duration: ArchiveDuration,
    /// `None` while active; set once the pit is archived by any trigger.
    pub archive_mode: Option<ArchiveMode>,
    /// Cached timestamp of the most recent activity, if ever observed.
    pub last_message_sent_at: Option<DateTime<Utc>>,
}

impl PitRecord {
    /// Whether the record is eligible for automatic archival scheduling.
    pub fn is_active(&self) -> bool {
        self.archive_mode.is_none()
    }
}
