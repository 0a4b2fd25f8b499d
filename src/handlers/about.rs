// Static pages

use serde_json::json;

use crate::render::Rendered;

pub async fn author() -> Rendered {
    Rendered::new("about/author.html", json!({}))
}

pub async fn tech() -> Rendered {
    Rendered::new("about/tech.html", json!({}))
}
