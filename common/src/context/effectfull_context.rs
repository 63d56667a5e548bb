use type_map::concurrent::TypeMap;

use crate::repository::RepositoryObject;

/// Process-wide state built once at startup and shared by every worker.
pub struct ServiceState {
    pub repositories: TypeMap,
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            repositories: TypeMap::new(),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}
