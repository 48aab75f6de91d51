use shared::{domain::MessageCatalog, error::CatalogError};

const MESSAGES: &[&str] = &[
    "Hello from the backend!",
    "Every click is a round trip.",
    "The counter lives in its own service.",
    "Your pick is saved for next time.",
    "Nothing here is computed locally.",
    "Try closing and reopening the window.",
    "Small shell, honest state.",
];

pub fn builtin() -> Result<MessageCatalog, CatalogError> {
    MessageCatalog::new(MESSAGES.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_every_message() {
        let catalog = builtin().expect("catalog");
        assert_eq!(catalog.len(), MESSAGES.len());
        assert!(catalog.iter().eq(MESSAGES.iter().copied()));
    }
}
