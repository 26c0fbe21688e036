use anyhow::bail;
use quarry::{Connection, Entity, Session, Validator};
use time::PrimitiveDateTime;

#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    #[quarry(join = "author_id")]
    pub author: Option<User>,
    pub created: Option<PrimitiveDateTime>,
    pub updated: Option<PrimitiveDateTime>,
}

#[derive(Entity, Debug, Default, Clone, PartialEq)]
#[quarry(name = "accounts", validate)]
pub struct Account {
    #[quarry(primary_key)]
    pub code: String,
    #[quarry(name = "mail")]
    pub email: String,
    #[quarry(skip)]
    pub scratch: Vec<String>,
}

impl Validator for Account {
    fn validate<C: Connection>(&self, session: &mut Session<C>) -> anyhow::Result<()> {
        if self.email.is_empty() {
            bail!("An email is required");
        }
        if session.contains_value::<Account>("mail", self.email.as_str())? {
            bail!("Email `{}` is already taken", self.email);
        }
        Ok(())
    }
}

/// No primary key.
#[derive(Entity, Debug, Default, Clone, PartialEq)]
pub struct Visit {
    pub path: String,
    pub hits: u32,
}
