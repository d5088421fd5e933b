use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier assigned to a content entry by the store
    EntryId
);
numeric_id!(
    /// Identifier of a media attachment
    AttachmentId
);
numeric_id!(
    /// Identifier of the user an entry is authored by
    AuthorId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&EntryId(42)).unwrap(), "42");
        let id: AttachmentId = serde_json::from_str("7").unwrap();
        assert_eq!(id, AttachmentId(7));
        assert_eq!(AuthorId(3).to_string(), "3");
    }
}
