// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Opening connections
//!
//! Connects through a driver-level [`Connector`]. When the server reports an
//! expired password the user is asked for a new one; if the new password is
//! accepted the connection is retried once.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{info, warn};
use xugu_host::{SqlFailure, UserInteraction};

use crate::error::{CatalogError, CatalogResult};
use crate::preferences::ConnectionSettings;
use crate::sql::EC_PASSWORD_EXPIRED;

/// Driver connection properties
pub type ConnectionProperties = BTreeMap<String, String>;

/// Property carrying the replacement for an expired password
pub const PROP_NEW_PASSWORD: &str = "xugu.jdbc.newPassword";
pub const PROP_SESSION_PROGRAM: &str = "v$session.program";
pub const PROP_SESSION_OS_USER: &str = "v$session.osuser";

const MAX_PROGRAM_NAME_LENGTH: usize = 48;

/// Driver-level connection factory
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Send;

    async fn connect(
        &self,
        user_name: &str,
        password: Option<&str>,
        properties: &ConnectionProperties,
    ) -> Result<Self::Connection, SqlFailure>;
}

/// Program name as the server accepts it: no brackets, at most 48 characters
pub fn session_program_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '(' || c == ')' { '_' } else { c })
        .take(MAX_PROGRAM_NAME_LENGTH)
        .collect()
}

fn os_user_name() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
}

/// Properties the connector receives on every connect
pub fn internal_connection_properties(settings: &ConnectionSettings) -> ConnectionProperties {
    let mut props = ConnectionProperties::new();
    if let Some(program) = &settings.program_name {
        props.insert(PROP_SESSION_PROGRAM.to_string(), session_program_name(program));
    }
    if settings.os_auth {
        if let Some(user) = os_user_name() {
            props.insert(PROP_SESSION_OS_USER.to_string(), user);
        }
    }
    props
}

/// Connect, recovering once from an expired password
///
/// On success after a password change `settings.password` holds the new
/// password.
pub async fn open_connection<C: Connector>(
    connector: &C,
    settings: &mut ConnectionSettings,
    interaction: &dyn UserInteraction,
) -> CatalogResult<C::Connection> {
    let user_name = settings.connection_user_name();
    let props = internal_connection_properties(settings);

    match connector
        .connect(&user_name, settings.password.as_deref(), &props)
        .await
    {
        Ok(connection) => Ok(connection),
        Err(failure) if failure.code == EC_PASSWORD_EXPIRED => {
            if !change_expired_password(connector, settings, &props, interaction).await {
                return Err(CatalogError::sql("Failed to open connection", failure));
            }
            info!("Password of '{}' changed, reconnecting", settings.user_name);
            connector
                .connect(&user_name, settings.password.as_deref(), &props)
                .await
                .map_err(|e| CatalogError::sql("Failed to open connection", e))
        }
        Err(failure) => Err(CatalogError::sql("Failed to open connection", failure)),
    }
}

async fn change_expired_password<C: Connector>(
    connector: &C,
    settings: &mut ConnectionSettings,
    props: &ConnectionProperties,
    interaction: &dyn UserInteraction,
) -> bool {
    let Some(change) = interaction
        .prompt_password_change(
            "Password has expired. Set new password.",
            &settings.user_name,
            settings.password.as_deref(),
        )
        .await
    else {
        return false;
    };

    let Some(new_password) = change.new_password else {
        let err = CatalogError::InvalidArgument("You can't set empty password".to_string());
        interaction.show_error("Error changing password", "Error changing expired password", &err);
        return false;
    };

    let mut change_props = props.clone();
    change_props.insert(PROP_NEW_PASSWORD.to_string(), new_password.clone());
    match connector
        .connect(
            &settings.connection_user_name(),
            settings.password.as_deref(),
            &change_props,
        )
        .await
    {
        Ok(_connection) => {
            settings.password = Some(new_password);
            true
        }
        Err(e) => {
            warn!("Expired password change failed: {}", e);
            interaction.show_error("Error changing password", "Error changing expired password", &e);
            false
        }
    }
}
