//! User and group administration over a borrowed iRODS connection.

use crate::{
    config::AdminConfig,
    connection::{Connection, PasswordObfuscator},
    group::Group,
    password::pad_password,
    user::{User, UserType, ZoneType, GROUP_TYPE},
    Result,
};
use irods_core::error::Error;
use irods_core::query::columns::{
    USER_DN, USER_GROUP_ID, USER_GROUP_NAME, USER_ID, USER_NAME, USER_TYPE, USER_ZONE, ZONE_NAME,
    ZONE_TYPE,
};
use irods_core::{AdminAction, AdminTarget, GenQuery, GeneralAdminInput, Row};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Issues user and group administration requests.
///
/// The administrator holds no session state. Every method borrows the caller's connection for
/// the duration of the call, performs at most a local zone lookup followed by one admin call or
/// catalog query, and never retries.
pub struct UserAdministrator {
    config: Arc<AdminConfig>,
    obfuscator: Arc<dyn PasswordObfuscator>,
}

impl UserAdministrator {
    /// Creates an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the configuration is invalid.
    pub fn new(config: AdminConfig, obfuscator: Arc<dyn PasswordObfuscator>) -> Result<Self> {
        config.check()?;
        Ok(Self {
            config: Arc::new(config),
            obfuscator,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    // User management

    /// Creates a user.
    ///
    /// For [`ZoneType::Local`] the zone sent to the server is the connection's local zone; the
    /// zone stored on `user` only affects the qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn make_user<C>(
        &self,
        conn: &mut C,
        user: &User,
        user_type: UserType,
        zone_type: ZoneType,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let local_zone = self.local_zone(conn).await?;
        let zone = match zone_type {
            ZoneType::Local => local_zone.clone(),
            ZoneType::Remote => String::new(),
        };

        debug!(user = %user, %user_type, %zone_type, "creating user");
        let input = GeneralAdminInput::new(AdminAction::Add, AdminTarget::User)
            .arg2(user.unique_name_in(&local_zone))
            .arg3(user_type.as_str())
            .arg4(zone);
        self.general_admin(conn, &input).await
    }

    /// Removes a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn remove_user<C>(&self, conn: &mut C, user: &User) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let name = self.unique_name(conn, user).await?;

        debug!(user = %user, "removing user");
        let input = GeneralAdminInput::new(AdminAction::Remove, AdminTarget::User)
            .arg2(name)
            .arg3(user.zone.as_str());
        self.general_admin(conn, &input).await
    }

    /// Sets a user's password. Only the obfuscated form is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserManagement`] if the obfuscation key cannot be retrieved and
    /// [`Error::RemoteCall`] when the server rejects the request.
    pub async fn set_user_password<C>(
        &self,
        conn: &mut C,
        user: &User,
        new_password: &SecretString,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let obfuscated = self.obfuscate_password(new_password)?;
        let name = self.unique_name(conn, user).await?;

        debug!(user = %user, "setting user password");
        let input = GeneralAdminInput::new(AdminAction::Modify, AdminTarget::User)
            .arg2(name)
            .arg3("password")
            .arg4(obfuscated);
        self.general_admin(conn, &input).await
    }

    /// Changes a user's type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn set_user_type<C>(
        &self,
        conn: &mut C,
        user: &User,
        new_user_type: UserType,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let name = self.unique_name(conn, user).await?;

        debug!(user = %user, user_type = %new_user_type, "setting user type");
        let input = GeneralAdminInput::new(AdminAction::Modify, AdminTarget::User)
            .arg2(name)
            .arg3("type")
            .arg4(new_user_type.as_str());
        self.general_admin(conn, &input).await
    }

    /// Binds an authentication name (e.g. a certificate DN) to a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn add_user_auth<C>(&self, conn: &mut C, user: &User, auth: &str) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        self.modify_user_auth(conn, user, "addAuth", auth).await
    }

    /// Unbinds an authentication name from a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn remove_user_auth<C>(&self, conn: &mut C, user: &User, auth: &str) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        self.modify_user_auth(conn, user, "rmAuth", auth).await
    }

    // Group management

    /// Creates a group in the local zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn make_group<C>(&self, conn: &mut C, group: &Group) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let zone = self.local_zone(conn).await?;

        debug!(group = %group, "creating group");
        let input = GeneralAdminInput::new(AdminAction::Add, AdminTarget::User)
            .arg2(group.name.as_str())
            .arg3(GROUP_TYPE)
            .arg4(zone);
        self.general_admin(conn, &input).await
    }

    /// Removes a group from the local zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn remove_group<C>(&self, conn: &mut C, group: &Group) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let zone = self.local_zone(conn).await?;

        debug!(group = %group, "removing group");
        let input = GeneralAdminInput::new(AdminAction::Remove, AdminTarget::User)
            .arg2(group.name.as_str())
            .arg3(zone);
        self.general_admin(conn, &input).await
    }

    /// Adds a user to a group. The user's name and zone are sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn add_user_to_group<C>(&self, conn: &mut C, group: &Group, user: &User) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        self.modify_group_membership(conn, group, user, "add").await
    }

    /// Removes a user from a group. The user's name and zone are sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteCall`] when the server rejects the request.
    pub async fn remove_user_from_group<C>(
        &self,
        conn: &mut C,
        group: &Group,
        user: &User,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        self.modify_group_membership(conn, group, user, "remove")
            .await
    }

    // Queries

    /// Lists every user (groups excluded).
    pub async fn users<C>(&self, conn: &mut C) -> Result<Vec<User>>
    where
        C: Connection + ?Sized,
    {
        let query = GenQuery::select(&[USER_NAME, USER_ZONE]).where_ne(USER_TYPE, GROUP_TYPE);
        self.collect_users(conn, &query).await
    }

    /// Lists the users that belong to `group`.
    pub async fn users_in_group<C>(&self, conn: &mut C, group: &Group) -> Result<Vec<User>>
    where
        C: Connection + ?Sized,
    {
        let query = GenQuery::select(&[USER_NAME, USER_ZONE])
            .where_ne(USER_TYPE, GROUP_TYPE)
            .where_eq(USER_GROUP_NAME, group.name.as_str());
        self.collect_users(conn, &query).await
    }

    /// Lists every group.
    ///
    /// Built-in groups that are not stored as `rodsgroup` entries (such as `public`) are not
    /// returned.
    pub async fn groups<C>(&self, conn: &mut C) -> Result<Vec<Group>>
    where
        C: Connection + ?Sized,
    {
        let query = GenQuery::select(&[USER_GROUP_NAME]).where_eq(USER_TYPE, GROUP_TYPE);
        self.collect_groups(conn, &query).await
    }

    /// Lists the groups `user` belongs to.
    pub async fn groups_of_user<C>(&self, conn: &mut C, user: &User) -> Result<Vec<Group>>
    where
        C: Connection + ?Sized,
    {
        let local_zone = self.local_zone(conn).await?;
        let query = GenQuery::select(&[USER_GROUP_NAME])
            .where_eq(USER_TYPE, GROUP_TYPE)
            .where_eq(USER_NAME, user.unique_name_in(&local_zone))
            .where_eq(USER_ZONE, resolved_zone(user, local_zone));
        self.collect_groups(conn, &query).await
    }

    /// Returns true if the user exists.
    pub async fn user_exists<C>(&self, conn: &mut C, user: &User) -> Result<bool>
    where
        C: Connection + ?Sized,
    {
        let query = self.user_query(conn, USER_ID, user).await?;
        Ok(self.first_row(conn, &query).await?.is_some())
    }

    /// Returns true if the group exists.
    pub async fn group_exists<C>(&self, conn: &mut C, group: &Group) -> Result<bool>
    where
        C: Connection + ?Sized,
    {
        let query = group_query(group);
        Ok(self.first_row(conn, &query).await?.is_some())
    }

    /// Returns the catalog id of a user, or `None` if the user does not exist.
    pub async fn user_id<C>(&self, conn: &mut C, user: &User) -> Result<Option<String>>
    where
        C: Connection + ?Sized,
    {
        let query = self.user_query(conn, USER_ID, user).await?;
        self.first_row(conn, &query)
            .await?
            .map(|row| row.column(0).map(str::to_string))
            .transpose()
    }

    /// Returns the catalog id of a group, or `None` if the group does not exist.
    pub async fn group_id<C>(&self, conn: &mut C, group: &Group) -> Result<Option<String>>
    where
        C: Connection + ?Sized,
    {
        let query = group_query(group);
        self.first_row(conn, &query)
            .await?
            .map(|row| row.column(0).map(str::to_string))
            .transpose()
    }

    /// Returns the type of a user, or `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserManagement`] if the catalog reports a type this crate does not know.
    pub async fn user_type<C>(&self, conn: &mut C, user: &User) -> Result<Option<UserType>>
    where
        C: Connection + ?Sized,
    {
        let query = self.user_query(conn, USER_TYPE, user).await?;
        self.first_row(conn, &query)
            .await?
            .map(|row| row.column(0)?.parse::<UserType>())
            .transpose()
    }

    /// Lists the authentication names bound to a user.
    pub async fn auth_names<C>(&self, conn: &mut C, user: &User) -> Result<Vec<String>>
    where
        C: Connection + ?Sized,
    {
        let query = self.user_query(conn, USER_DN, user).await?;
        self.run_query(conn, &query)
            .await?
            .iter()
            .map(|row| row.column(0).map(str::to_string))
            .collect()
    }

    /// Returns true if `user` is a member of `group`.
    pub async fn user_is_member_of_group<C>(
        &self,
        conn: &mut C,
        group: &Group,
        user: &User,
    ) -> Result<bool>
    where
        C: Connection + ?Sized,
    {
        let query = self
            .user_query(conn, USER_ID, user)
            .await?
            .where_eq(USER_GROUP_NAME, group.name.as_str());
        Ok(self.first_row(conn, &query).await?.is_some())
    }

    // Utility

    /// Returns the name the server uses to identify `user`.
    ///
    /// Users of the local zone (or with no zone) keep their plain name; all others are
    /// qualified as `name#zone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserManagement`] if the local zone cannot be determined.
    pub async fn unique_name<C>(&self, conn: &mut C, user: &User) -> Result<String>
    where
        C: Connection + ?Sized,
    {
        if user.has_local_zone() {
            return Ok(user.name.clone());
        }

        let local_zone = self.local_zone(conn).await?;
        Ok(user.unique_name_in(&local_zone))
    }

    /// Returns the name of the zone the connection is attached to.
    ///
    /// The configured zone is used when present; otherwise the catalog is asked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserManagement`] if the catalog reports no local zone.
    pub async fn local_zone<C>(&self, conn: &mut C) -> Result<String>
    where
        C: Connection + ?Sized,
    {
        if let Some(zone) = self.config.local_zone() {
            return Ok(zone.to_string());
        }

        let query = GenQuery::select(&[ZONE_NAME]).where_eq(ZONE_TYPE, "local");
        match self.first_row(conn, &query).await? {
            Some(row) => Ok(row.column(0)?.to_string()),
            None => Err(Error::UserManagement(
                "cannot get local zone name".to_string(),
            )),
        }
    }

    async fn modify_user_auth<C>(
        &self,
        conn: &mut C,
        user: &User,
        option: &str,
        auth: &str,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        let name = self.unique_name(conn, user).await?;

        debug!(user = %user, option, "modifying user authentication names");
        let input = GeneralAdminInput::new(AdminAction::Modify, AdminTarget::User)
            .arg2(name)
            .arg3(option)
            .arg4(auth);
        self.general_admin(conn, &input).await
    }

    async fn modify_group_membership<C>(
        &self,
        conn: &mut C,
        group: &Group,
        user: &User,
        option: &str,
    ) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        debug!(group = %group, user = %user, option, "modifying group membership");
        let input = GeneralAdminInput::new(AdminAction::Modify, AdminTarget::Group)
            .arg2(group.name.as_str())
            .arg3(option)
            .arg4(user.name.as_str())
            .arg5(user.zone.as_str());
        self.general_admin(conn, &input).await
    }

    fn obfuscate_password(&self, new_password: &SecretString) -> Result<String> {
        use secrecy::ExposeSecret;

        let plain_text = pad_password(new_password.expose_secret());
        let key = self.obfuscator.obfuscation_key().map_err(|err| {
            warn!("failed to retrieve password obfuscation key: {err}");
            Error::UserManagement("password obfuscation failed".to_string())
        })?;

        Ok(self.obfuscator.encode_by_key(&plain_text, &key))
    }

    async fn user_query<C>(&self, conn: &mut C, column: &'static str, user: &User) -> Result<GenQuery>
    where
        C: Connection + ?Sized,
    {
        let local_zone = self.local_zone(conn).await?;
        Ok(GenQuery::select(&[column])
            .where_ne(USER_TYPE, GROUP_TYPE)
            .where_eq(USER_NAME, user.unique_name_in(&local_zone))
            .where_eq(USER_ZONE, resolved_zone(user, local_zone)))
    }

    async fn collect_users<C>(&self, conn: &mut C, query: &GenQuery) -> Result<Vec<User>>
    where
        C: Connection + ?Sized,
    {
        self.run_query(conn, query)
            .await?
            .iter()
            .map(|row| -> Result<User> { Ok(User::in_zone(row.column(0)?, row.column(1)?)) })
            .collect()
    }

    async fn collect_groups<C>(&self, conn: &mut C, query: &GenQuery) -> Result<Vec<Group>>
    where
        C: Connection + ?Sized,
    {
        self.run_query(conn, query)
            .await?
            .iter()
            .map(|row| row.column(0).map(Group::new))
            .collect()
    }

    async fn first_row<C>(&self, conn: &mut C, query: &GenQuery) -> Result<Option<Row>>
    where
        C: Connection + ?Sized,
    {
        Ok(self.run_query(conn, query).await?.into_iter().next())
    }

    async fn run_query<C>(&self, conn: &mut C, query: &GenQuery) -> Result<Vec<Row>>
    where
        C: Connection + ?Sized,
    {
        let gql = query.build()?;
        debug!(gql = gql.as_str(), "running catalog query");
        self.execute_with_timeout(conn.query(&gql)).await
    }

    async fn general_admin<C>(&self, conn: &mut C, input: &GeneralAdminInput) -> Result<()>
    where
        C: Connection + ?Sized,
    {
        // arg4 may carry a password, never log it.
        debug!(
            action = %input.action(),
            target = %input.target(),
            primary = input.primary(),
            "issuing general admin request"
        );

        let status = self
            .execute_with_timeout(async { Ok::<_, Error>(conn.general_admin(input).await) })
            .await?;

        if status != 0 {
            warn!(
                status,
                action = %input.action(),
                target = %input.target(),
                primary = input.primary(),
                "general admin request failed"
            );
            return Err(Error::RemoteCall { status });
        }

        Ok(())
    }

    async fn execute_with_timeout<F, T>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        timeout(self.config.operation_timeout(), fut)
            .await
            .map_err(|_| Error::Timeout("iRODS operation timed out".to_string()))?
    }
}

fn resolved_zone(user: &User, local_zone: String) -> String {
    if user.has_local_zone() {
        local_zone
    } else {
        user.zone.clone()
    }
}

fn group_query(group: &Group) -> GenQuery {
    GenQuery::select(&[USER_GROUP_ID])
        .where_eq(USER_TYPE, GROUP_TYPE)
        .where_eq(USER_GROUP_NAME, group.name.as_str())
}
