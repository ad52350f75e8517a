use std::collections::HashMap;

use anyhow::Result;

use crate::server::scope::Scope;
use crate::types::org::Role;

use super::MembershipGraph;

#[derive(Default)]
pub struct MemoryGraph {
    roles: HashMap<(Scope, String), Role>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, scope: Scope, user_id: &str, role: Role) {
        self.roles.insert((scope, user_id.to_string()), role);
    }
}

impl MembershipGraph for MemoryGraph {
    fn role_at(&self, scope: &Scope, user_id: &str) -> Result<Option<Role>> {
        Ok(self
            .roles
            .get(&(scope.clone(), user_id.to_string()))
            .copied())
    }
}
