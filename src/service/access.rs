use std::collections::HashSet;
use std::sync::Arc;

use teloxide::types::{ChatId, UserId};

/// Who may use the bot, and where operational alerts go.
#[derive(Debug, Clone)]
pub struct AccessService {
    whitelist: Arc<HashSet<UserId>>,
    admin_chat: ChatId,
}

impl AccessService {
    pub fn new(whitelist: &[UserId], admin_chat: ChatId) -> Self {
        if whitelist.is_empty() {
            warn!("Whitelist is empty, every user will be denied");
        }
        Self {
            whitelist: Arc::new(whitelist.iter().copied().collect()),
            admin_chat,
        }
    }

    /// Exact membership. The admin chat is not implicitly whitelisted.
    pub fn is_allowed(&self, user: UserId) -> bool {
        self.whitelist.contains(&user)
    }

    pub fn admin_chat(&self) -> ChatId {
        self.admin_chat
    }

    pub fn whitelist_size(&self) -> usize {
        self.whitelist.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let access = AccessService::new(&[UserId(1), UserId(42)], ChatId(7));

        assert!(access.is_allowed(UserId(42)));
        assert!(!access.is_allowed(UserId(43)));
        assert_eq!(access.admin_chat(), ChatId(7));
        assert_eq!(access.whitelist_size(), 2);
    }

    #[test]
    fn test_admin_is_not_implicitly_allowed() {
        let access = AccessService::new(&[UserId(1)], ChatId(7));
        assert!(!access.is_allowed(UserId(7)));
    }

    #[test]
    fn test_empty_whitelist_denies_everyone() {
        let access = AccessService::new(&[], ChatId(7));
        assert!(!access.is_allowed(UserId(1)));
    }
}
