use crate::UserId;

/// The user looking at a thread, as far as comment permissions are concerned
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Viewer {
    pub id: UserId,
    pub is_superuser: bool,
}

impl Viewer {
    pub fn user(id: UserId) -> Viewer {
        Viewer {
            id,
            is_superuser: false,
        }
    }

    pub fn superuser(id: UserId) -> Viewer {
        Viewer {
            id,
            is_superuser: true,
        }
    }

    /// Anyone can read, but only the owner or a superuser can edit or delete
    pub fn can_modify(&self, owner: UserId) -> bool {
        self.id == owner || self.is_superuser
    }
}
