use repositories::memory::Entity;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    Closed,
}

impl Status {
    /// The value this status serializes to.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Closed => "CLOSED",
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: Option<Uuid>,
    pub title: String,
    pub status: Status,
    pub tags: Vec<String>,
}

impl Todo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: Status::Open,
            tags: Vec::new(),
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn close(&mut self) {
        self.status = Status::Closed;
    }
}

impl Entity for Todo {
    type Ident = Uuid;

    fn ident(&self) -> Option<&Uuid> {
        self.id.as_ref()
    }

    fn set_ident(&mut self, ident: Uuid) {
        self.id = Some(ident);
    }
}
