use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::builder::{EditChannel, GetMessages};
use serenity::http::{Http, HttpError};
use serenity::model::channel::{Channel, ChannelType, PermissionOverwrite, PermissionOverwriteType};
use serenity::model::id::{ChannelId, RoleId};
use serenity::model::permissions::Permissions;
use tracing::debug;

use pitward_channels::{ChannelGateway, ChannelSnapshot, GatewayError};
use pitward_core::config::DiscordConfig;

/// Discord channel gateway.
///
/// Archiving moves the pit under the archive category, hides it from
/// @everyone and keeps the counselors role (and administrators, who bypass
/// overwrites) able to see it. Un-archiving moves it back under the pits
/// category with a neutral @everyone overwrite.
pub struct DiscordGateway {
    http: Arc<Http>,
    config: DiscordConfig,
}

impl DiscordGateway {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            http: Arc::new(Http::new(&config.token)),
            config: config.clone(),
        }
    }

    /// Reuse an existing REST client, e.g. the one a full bot client owns.
    pub fn with_http(http: Arc<Http>, config: &DiscordConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    /// The guild id doubles as the @everyone role id.
    fn everyone_role(&self) -> RoleId {
        RoleId::new(self.config.guild_id)
    }
}

#[async_trait]
impl ChannelGateway for DiscordGateway {
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelSnapshot>, GatewayError> {
        match self.http.get_channel(ChannelId::new(channel_id)).await {
            Ok(Channel::Guild(channel)) if channel.kind == ChannelType::Text => {
                Ok(Some(ChannelSnapshot {
                    channel_id,
                    created_at: to_utc(channel.id.created_at()),
                }))
            }
            // DMs, categories, threads — never pits.
            Ok(_) => Ok(None),
            Err(e) => match classify(channel_id, e) {
                GatewayError::NotFound { .. } => Ok(None),
                other => Err(other),
            },
        }
    }

    async fn latest_message_at(
        &self,
        channel_id: u64,
    ) -> Result<Option<DateTime<Utc>>, GatewayError> {
        let messages = ChannelId::new(channel_id)
            .messages(&self.http, GetMessages::new().limit(1))
            .await
            .map_err(|e| classify(channel_id, e))?;
        Ok(messages.first().map(|m| to_utc(m.timestamp)))
    }

    async fn archive_channel(&self, channel_id: u64) -> Result<(), GatewayError> {
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(self.everyone_role()),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(RoleId::new(self.config.counselors_role_id)),
            },
        ];
        let edit = EditChannel::new()
            .category(Some(ChannelId::new(self.config.archive_category_id)))
            .permissions(overwrites);

        debug!(channel_id, "moving channel into the archive category");
        ChannelId::new(channel_id)
            .edit(&self.http, edit)
            .await
            .map(|_| ())
            .map_err(|e| classify(channel_id, e))
    }

    async fn unarchive_channel(&self, channel_id: u64) -> Result<(), GatewayError> {
        let overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(self.everyone_role()),
        }];
        let edit = EditChannel::new()
            .category(Some(ChannelId::new(self.config.pit_category_id)))
            .permissions(overwrites);

        debug!(channel_id, "moving channel back into the pits category");
        ChannelId::new(channel_id)
            .edit(&self.http, edit)
            .await
            .map(|_| ())
            .map_err(|e| classify(channel_id, e))
    }
}

fn to_utc(ts: serenity::model::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_default()
}

/// Map a serenity error onto the gateway taxonomy: 403 → permission denied,
/// 404 → not found, everything else stays an opaque HTTP failure.
fn classify(channel_id: u64, err: serenity::Error) -> GatewayError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(ref resp)) = err {
        match resp.status_code.as_u16() {
            403 => return GatewayError::PermissionDenied { channel_id },
            404 => return GatewayError::NotFound { channel_id },
            _ => {}
        }
    }
    GatewayError::Http(err.to_string())
}
