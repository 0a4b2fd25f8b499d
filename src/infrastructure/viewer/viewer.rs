// Request-scoped identity of whoever is making the request

use crate::models::Author;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Author(Author),
}

#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub request_id: String,
    pub viewer: Viewer,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        Self {
            request_id,
            viewer: Viewer::Anonymous,
        }
    }

    pub fn authenticated(author: Author, request_id: String) -> Self {
        Self {
            request_id,
            viewer: Viewer::Author(author),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.viewer, Viewer::Author(_))
    }

    pub fn author(&self) -> Option<&Author> {
        match &self.viewer {
            Viewer::Author(author) => Some(author),
            Viewer::Anonymous => None,
        }
    }
}
