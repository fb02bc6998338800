//! Round-trip tests against an in-memory catalog.
//!
//! The fake catalog interprets general admin requests and the restriction subset of the query
//! language used by the administrator, so create/inspect/remove sequences can be checked end to
//! end without a server.

use async_trait::async_trait;
use irods_admin::{
    AdminConfig, Connection, Group, PasswordObfuscator, User, UserAdministrator, UserType,
    ZoneType,
};
use irods_core::{Error, GeneralAdminInput, Result, Row};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;

const LOCAL_ZONE: &str = "tempZone";
const CAT_INVALID_USER: i32 = -827_000;
const CATALOG_ALREADY_HAS_ITEM_BY_THAT_NAME: i32 = -809_000;
const SYS_INVALID_INPUT_PARAM: i32 = -130_000;

struct Entry {
    id: String,
    name: String,
    zone: String,
    kind: String,
    auth_names: Vec<String>,
    password: Option<String>,
}

struct FakeCatalog {
    entries: Vec<Entry>,
    memberships: Vec<(String, String)>,
    next_id: u64,
}

impl FakeCatalog {
    fn new() -> Self {
        let mut catalog = Self {
            entries: Vec::new(),
            memberships: Vec::new(),
            next_id: 10_000,
        };
        catalog.insert("rods", LOCAL_ZONE, "rodsadmin");
        catalog.insert("rodsadmin", LOCAL_ZONE, "rodsgroup");
        catalog
    }

    fn insert(&mut self, name: &str, zone: &str, kind: &str) {
        self.next_id += 1;
        self.entries.push(Entry {
            id: self.next_id.to_string(),
            name: name.to_string(),
            zone: zone.to_string(),
            kind: kind.to_string(),
            auth_names: Vec::new(),
            password: None,
        });
    }

    fn position(&self, name: &str, zone: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name == name && entry.zone == zone)
    }

    // Server-side handling of `name#zone` qualified names.
    fn split_name<'a>(qualified: &'a str, zone: &'a str) -> (&'a str, &'a str) {
        match qualified.split_once('#') {
            Some((name, zone)) => (name, zone),
            None if zone.is_empty() => (qualified, LOCAL_ZONE),
            None => (qualified, zone),
        }
    }

    fn add(&mut self, qualified: &str, kind: &str, zone: &str) -> i32 {
        let (name, zone) = Self::split_name(qualified, zone);
        if self.position(name, zone).is_some() {
            return CATALOG_ALREADY_HAS_ITEM_BY_THAT_NAME;
        }
        self.insert(name, zone, kind);
        0
    }

    fn remove(&mut self, qualified: &str, zone: &str) -> i32 {
        let (name, zone) = Self::split_name(qualified, zone);
        match self.position(name, zone) {
            Some(index) => {
                let removed = self.entries.remove(index);
                self.memberships
                    .retain(|(user, group)| *user != removed.id && *group != removed.name);
                0
            }
            None => CAT_INVALID_USER,
        }
    }

    fn modify_user(&mut self, qualified: &str, option: &str, value: &str) -> i32 {
        let (name, zone) = Self::split_name(qualified, "");
        let Some(index) = self.position(name, zone) else {
            return CAT_INVALID_USER;
        };
        let entry = &mut self.entries[index];
        match option {
            "password" => entry.password = Some(value.to_string()),
            "type" => entry.kind = value.to_string(),
            "addAuth" => entry.auth_names.push(value.to_string()),
            "rmAuth" => entry.auth_names.retain(|auth| auth != value),
            _ => return SYS_INVALID_INPUT_PARAM,
        }
        0
    }

    fn modify_group(&mut self, group: &str, option: &str, user: &str, zone: &str) -> i32 {
        let zone = if zone.is_empty() { LOCAL_ZONE } else { zone };
        let (Some(user_index), Some(_)) = (self.position(user, zone), self.position(group, LOCAL_ZONE))
        else {
            return CAT_INVALID_USER;
        };
        let membership = (self.entries[user_index].id.clone(), group.to_string());
        match option {
            "add" => self.memberships.push(membership),
            "remove" => self.memberships.retain(|existing| *existing != membership),
            _ => return SYS_INVALID_INPUT_PARAM,
        }
        0
    }

    fn group_id(&self, name: &str) -> String {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id.clone())
            .unwrap_or_default()
    }

    // One joined record per (entry, group, auth name), like the catalog's user/group join.
    fn records(&self) -> Vec<HashMap<&'static str, String>> {
        let mut records = Vec::new();
        for entry in &self.entries {
            let mut groups = vec![entry.name.clone()];
            groups.extend(
                self.memberships
                    .iter()
                    .filter(|(user, _)| *user == entry.id)
                    .map(|(_, group)| group.clone()),
            );
            let auth_names = if entry.auth_names.is_empty() {
                vec![String::new()]
            } else {
                entry.auth_names.clone()
            };

            for group in &groups {
                for auth in &auth_names {
                    records.push(HashMap::from([
                        ("USER_NAME", entry.name.clone()),
                        ("USER_ZONE", entry.zone.clone()),
                        ("USER_TYPE", entry.kind.clone()),
                        ("USER_ID", entry.id.clone()),
                        ("USER_DN", auth.clone()),
                        ("USER_GROUP_NAME", group.clone()),
                        ("USER_GROUP_ID", self.group_id(group)),
                        ("ZONE_NAME", LOCAL_ZONE.to_string()),
                        ("ZONE_TYPE", "local".to_string()),
                    ]));
                }
            }
        }
        records
    }

    fn run(&self, gql: &str) -> Vec<Row> {
        let body = gql.strip_prefix("select ").expect("query starts with select");
        let (selection, restriction) = body.split_once(" where ").unwrap_or((body, ""));
        let columns: Vec<&str> = selection.split(", ").collect();
        let conditions: Vec<(&str, bool, &str)> = restriction
            .split(" and ")
            .filter(|condition| !condition.is_empty())
            .map(|condition| {
                let (column, equal, value) = match condition.split_once(" != ") {
                    Some((column, value)) => (column, false, value),
                    None => {
                        let (column, value) = condition.split_once(" = ").expect("comparison");
                        (column, true, value)
                    }
                };
                (column, equal, value.trim_matches('\''))
            })
            .collect();

        let mut rows: Vec<Row> = Vec::new();
        for record in self.records() {
            let matches = conditions
                .iter()
                .all(|(column, equal, value)| (record[*column] == *value) == *equal);
            if !matches {
                continue;
            }

            let values: Vec<String> = columns.iter().map(|column| record[*column].clone()).collect();
            if values.iter().any(String::is_empty) {
                continue;
            }
            let row = Row::from(values);
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
        rows
    }
}

#[async_trait]
impl Connection for FakeCatalog {
    async fn general_admin(&mut self, input: &GeneralAdminInput) -> i32 {
        match input.args() {
            ["add", "user", name, kind, zone, _] => self.add(name, kind, zone),
            ["rm", "user", name, zone, _, _] => self.remove(name, zone),
            ["modify", "user", name, option, value, _] => self.modify_user(name, option, value),
            ["modify", "group", group, option, user, zone] => {
                self.modify_group(group, option, user, zone)
            }
            _ => SYS_INVALID_INPUT_PARAM,
        }
    }

    async fn query(&mut self, gql: &str) -> Result<Vec<Row>> {
        Ok(self.run(gql))
    }
}

struct StoredKeyObfuscator {
    key: Option<&'static str>,
}

impl PasswordObfuscator for StoredKeyObfuscator {
    fn obfuscation_key(&self) -> Result<SecretString> {
        self.key
            .map(|key| SecretString::from(key.to_string()))
            .ok_or_else(|| Error::UserManagement("no stored password".to_string()))
    }

    fn encode_by_key(&self, plain_text: &SecretString, key: &SecretString) -> String {
        plain_text
            .expose_secret()
            .bytes()
            .zip(key.expose_secret().bytes().cycle())
            .map(|(plain, key)| format!("{:02x}", plain ^ key))
            .collect()
    }
}

fn administrator() -> UserAdministrator {
    UserAdministrator::new(
        AdminConfig::new(),
        Arc::new(StoredKeyObfuscator { key: Some("rods") }),
    )
    .unwrap()
}

#[tokio::test]
async fn create_then_remove_user() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();
    let alice = User::in_zone("alice", LOCAL_ZONE);

    assert!(!admin.user_exists(&mut catalog, &alice).await.unwrap());

    admin
        .make_user(&mut catalog, &alice, UserType::Rodsuser, ZoneType::Local)
        .await
        .unwrap();
    assert!(admin.user_exists(&mut catalog, &alice).await.unwrap());
    assert!(admin.user_id(&mut catalog, &alice).await.unwrap().is_some());
    assert_eq!(
        admin.user_type(&mut catalog, &alice).await.unwrap(),
        Some(UserType::Rodsuser)
    );
    assert!(admin
        .users(&mut catalog)
        .await
        .unwrap()
        .contains(&alice));

    admin.remove_user(&mut catalog, &alice).await.unwrap();
    assert!(!admin.user_exists(&mut catalog, &alice).await.unwrap());
    assert_eq!(admin.user_id(&mut catalog, &alice).await.unwrap(), None);
    assert_eq!(admin.user_type(&mut catalog, &alice).await.unwrap(), None);
}

#[tokio::test]
async fn user_without_zone_resolves_to_local() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();

    admin
        .make_user(
            &mut catalog,
            &User::new("bob"),
            UserType::Rodsuser,
            ZoneType::Local,
        )
        .await
        .unwrap();

    assert!(admin
        .user_exists(&mut catalog, &User::in_zone("bob", LOCAL_ZONE))
        .await
        .unwrap());
    assert!(admin
        .user_exists(&mut catalog, &User::new("bob"))
        .await
        .unwrap());
}

#[tokio::test]
async fn users_excludes_groups() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();

    let users = admin.users(&mut catalog).await.unwrap();
    assert_eq!(users, vec![User::in_zone("rods", LOCAL_ZONE)]);

    let groups = admin.groups(&mut catalog).await.unwrap();
    assert_eq!(groups, vec![Group::new("rodsadmin")]);
}

#[tokio::test]
async fn group_membership_round_trip() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();
    let alice = User::in_zone("alice", LOCAL_ZONE);
    let researchers = Group::new("researchers");

    admin
        .make_user(&mut catalog, &alice, UserType::Rodsuser, ZoneType::Local)
        .await
        .unwrap();
    admin.make_group(&mut catalog, &researchers).await.unwrap();
    assert!(admin.group_exists(&mut catalog, &researchers).await.unwrap());
    assert!(admin
        .group_id(&mut catalog, &researchers)
        .await
        .unwrap()
        .is_some());
    assert!(admin
        .groups(&mut catalog)
        .await
        .unwrap()
        .contains(&researchers));

    admin
        .add_user_to_group(&mut catalog, &researchers, &alice)
        .await
        .unwrap();
    assert!(admin
        .user_is_member_of_group(&mut catalog, &researchers, &alice)
        .await
        .unwrap());
    assert_eq!(
        admin
            .users_in_group(&mut catalog, &researchers)
            .await
            .unwrap(),
        vec![alice.clone()]
    );

    admin
        .remove_user_from_group(&mut catalog, &researchers, &alice)
        .await
        .unwrap();
    assert!(!admin
        .user_is_member_of_group(&mut catalog, &researchers, &alice)
        .await
        .unwrap());
    assert!(admin
        .users_in_group(&mut catalog, &researchers)
        .await
        .unwrap()
        .is_empty());

    admin.remove_group(&mut catalog, &researchers).await.unwrap();
    assert!(!admin.group_exists(&mut catalog, &researchers).await.unwrap());
    assert_eq!(admin.group_id(&mut catalog, &researchers).await.unwrap(), None);
}

#[tokio::test]
async fn user_type_and_auth_names_round_trip() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();
    let carol = User::new("carol");
    let dn = "/C=US/O=Example/CN=carol";

    admin
        .make_user(&mut catalog, &carol, UserType::Rodsuser, ZoneType::Local)
        .await
        .unwrap();

    admin
        .set_user_type(&mut catalog, &carol, UserType::Rodsadmin)
        .await
        .unwrap();
    assert_eq!(
        admin.user_type(&mut catalog, &carol).await.unwrap(),
        Some(UserType::Rodsadmin)
    );

    assert!(admin.auth_names(&mut catalog, &carol).await.unwrap().is_empty());
    admin.add_user_auth(&mut catalog, &carol, dn).await.unwrap();
    assert_eq!(
        admin.auth_names(&mut catalog, &carol).await.unwrap(),
        vec![dn.to_string()]
    );
    admin
        .remove_user_auth(&mut catalog, &carol, dn)
        .await
        .unwrap();
    assert!(admin.auth_names(&mut catalog, &carol).await.unwrap().is_empty());
}

#[tokio::test]
async fn password_stored_only_in_obfuscated_form() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();
    let dave = User::new("dave");

    admin
        .make_user(&mut catalog, &dave, UserType::Rodsuser, ZoneType::Local)
        .await
        .unwrap();
    admin
        .set_user_password(
            &mut catalog,
            &dave,
            &SecretString::from("correct horse".to_string()),
        )
        .await
        .unwrap();

    let stored = catalog
        .entries
        .iter()
        .find(|entry| entry.name == "dave")
        .and_then(|entry| entry.password.clone())
        .unwrap();
    assert!(!stored.contains("correct horse"));
    // 40 padded bytes, two hex digits each.
    assert_eq!(stored.len(), 80);
}

#[tokio::test]
async fn password_update_fails_without_key() {
    let mut catalog = FakeCatalog::new();
    let admin = UserAdministrator::new(
        AdminConfig::new(),
        Arc::new(StoredKeyObfuscator { key: None }),
    )
    .unwrap();

    let err = admin
        .set_user_password(
            &mut catalog,
            &User::new("rods"),
            &SecretString::from("new-password".to_string()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UserManagement(_)));
}

#[tokio::test]
async fn remote_failures_carry_status() {
    let mut catalog = FakeCatalog::new();
    let admin = administrator();

    let err = admin
        .remove_user(&mut catalog, &User::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(CAT_INVALID_USER));

    let err = admin
        .make_user(
            &mut catalog,
            &User::new("rods"),
            UserType::Rodsadmin,
            ZoneType::Local,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        Error::RemoteCall {
            status: CATALOG_ALREADY_HAS_ITEM_BY_THAT_NAME
        }
    );
}

#[tokio::test]
async fn configured_zone_skips_catalog_lookup() {
    let mut catalog = FakeCatalog::new();
    let admin = UserAdministrator::new(
        AdminConfig::new().with_local_zone(LOCAL_ZONE),
        Arc::new(StoredKeyObfuscator { key: Some("rods") }),
    )
    .unwrap();

    assert_eq!(admin.local_zone(&mut catalog).await.unwrap(), LOCAL_ZONE);
    assert_eq!(
        admin
            .unique_name(&mut catalog, &User::in_zone("rods", "otherZone"))
            .await
            .unwrap(),
        "rods#otherZone"
    );
}
