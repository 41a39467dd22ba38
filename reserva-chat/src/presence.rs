use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Tracks which users currently hold at least one live event stream.
///
/// A user can be connected from several tabs/devices, so entries are
/// reference counts rather than booleans.
pub struct PresenceRegistry {
    connections: RwLock<HashMap<Uuid, usize>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection. Returns true when the user just came online.
    pub fn connect(&self, user_id: Uuid) -> bool {
        let mut connections = self.connections.write().expect("presence lock poisoned");
        let count = connections.entry(user_id).or_insert(0);
        *count += 1;
        *count == 1
    }

    /// Drop a connection. Returns true when the user just went offline.
    pub fn disconnect(&self, user_id: Uuid) -> bool {
        let mut connections = self.connections.write().expect("presence lock poisoned");
        match connections.get_mut(&user_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                connections.remove(&user_id);
                true
            }
            None => false,
        }
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.connections
            .read()
            .expect("presence lock poisoned")
            .contains_key(&user_id)
    }

    pub fn online_count(&self) -> usize {
        self.connections
            .read()
            .expect("presence lock poisoned")
            .len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refcounted_presence() {
        let registry = PresenceRegistry::new();
        let user = Uuid::new_v4();

        assert!(!registry.is_online(user));

        // First tab brings the user online, second does not re-announce
        assert!(registry.connect(user));
        assert!(!registry.connect(user));
        assert!(registry.is_online(user));

        // Closing one tab keeps them online, closing the last drops them
        assert!(!registry.disconnect(user));
        assert!(registry.disconnect(user));
        assert!(!registry.is_online(user));

        // Disconnecting an unknown user is a no-op
        assert!(!registry.disconnect(user));
    }
}
