use anyhow::Result;
use uuid::Uuid;

use crate::main_db::{MainDb, Setting};

pub const DEFAULT_USERNAME: &str = "Anonymous";

/// The local, anonymous identity shown in the member center. Nothing here
/// is used for authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub user_id: String,
}

fn generate_user_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}

impl Profile {
    // The user id is created on first load and never changes afterwards.
    pub fn load(main_db: &mut MainDb) -> Result<Profile> {
        let username = main_db
            .get_setting::<String>(Setting::Username)?
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let user_id = match main_db.get_setting::<String>(Setting::UserId)? {
            Some(user_id) => user_id,
            None => {
                let user_id = generate_user_id();
                info!("[profile] generated user id: {}", user_id);
                main_db.set_setting(Setting::UserId, &user_id)?;
                user_id
            }
        };
        Ok(Profile { username, user_id })
    }

    pub fn set_username(main_db: &mut MainDb, username: &str) -> Result<()> {
        main_db.set_setting(Setting::Username, username)
    }
}
