// Validation of the post and comment forms

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::models::{Group, GroupId, PostView};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Field name to error messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Raw post form as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostFormData {
    pub text: String,
    /// Group id, empty for none
    pub group: String,
    /// Base64-encoded image bytes, empty for no upload
    #[serde(skip_serializing)]
    pub image: String,
    pub image_name: String,
}

impl PostFormData {
    /// Form bound to an existing post, as shown on the edit page
    pub fn from_post(post: &PostView) -> Self {
        Self {
            text: post.text.clone(),
            group: post
                .group
                .as_ref()
                .map(|group| group.id.to_string())
                .unwrap_or_default(),
            image: String::new(),
            image_name: post.image.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<GroupId>,
    pub image: Option<ImageUpload>,
}

pub fn validate_post(data: &PostFormData, groups: &[Group]) -> Result<ValidPost, FormErrors> {
    let mut errors = FormErrors::default();

    let text = data.text.trim();
    if text.is_empty() {
        errors.add("text", REQUIRED);
    }

    let group = data.group.trim();
    let group_id = if group.is_empty() {
        None
    } else {
        match group.parse::<GroupId>() {
            Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
            _ => {
                errors.add("group", INVALID_CHOICE);
                None
            }
        }
    };

    let image = match decode_image(&data.image) {
        Ok(None) => None,
        Ok(Some(bytes)) => Some(ImageUpload {
            name: image_file_name(&data.image_name, &bytes),
            data: bytes,
        }),
        Err(()) => {
            errors.add("image", INVALID_IMAGE);
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ValidPost {
        text: text.to_string(),
        group_id,
        image,
    })
}

/// Form context handed to `posts/create_post.html`
pub fn post_form_context(data: &PostFormData, errors: &FormErrors, groups: &[Group]) -> Value {
    let choices: Vec<Value> = groups
        .iter()
        .map(|group| json!({ "id": group.id, "title": group.title }))
        .collect();
    json!({
        "fields": data,
        "errors": errors,
        "groups": choices,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CommentFormData {
    pub text: String,
}

pub fn validate_comment(data: &CommentFormData) -> Result<String, FormErrors> {
    let text = data.text.trim();
    if text.is_empty() {
        let mut errors = FormErrors::default();
        errors.add("text", REQUIRED);
        return Err(errors);
    }
    Ok(text.to_string())
}

pub fn comment_form_context(data: &CommentFormData, errors: &FormErrors) -> Value {
    json!({ "fields": data, "errors": errors })
}

/// Identify an image by its leading bytes
pub fn sniff_image_format(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

fn decode_image(encoded: &str) -> Result<Option<Vec<u8>>, ()> {
    let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if encoded.is_empty() {
        return Ok(None);
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|_| ())?;
    match sniff_image_format(&bytes) {
        Some(_) => Ok(Some(bytes)),
        None => Err(()),
    }
}

fn image_file_name(name: &str, bytes: &[u8]) -> String {
    let name = name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    format!("image.{}", sniff_image_format(bytes).unwrap_or("bin"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0c\n\x00;";

    fn groups() -> Vec<Group> {
        vec![Group {
            id: 3,
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        }]
    }

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_valid_post_with_group_and_image() {
        let data = PostFormData {
            text: "  hello  ".to_string(),
            group: "3".to_string(),
            image: encode(SMALL_GIF),
            image_name: "small.gif".to_string(),
        };
        let post = validate_post(&data, &groups()).unwrap();
        assert_eq!(post.text, "hello");
        assert_eq!(post.group_id, Some(3));
        let image = post.image.unwrap();
        assert_eq!(image.name, "small.gif");
        assert_eq!(image.data, SMALL_GIF);
    }

    #[test]
    fn test_blank_text_is_required() {
        let data = PostFormData {
            text: "   ".to_string(),
            ..Default::default()
        };
        let errors = validate_post(&data, &groups()).unwrap_err();
        assert_eq!(errors.field("text"), [REQUIRED.to_string()]);
        assert!(errors.field("group").is_empty());
    }

    #[test]
    fn test_unknown_group_is_rejected() {
        for group in ["99", "cats"] {
            let data = PostFormData {
                text: "hello".to_string(),
                group: group.to_string(),
                ..Default::default()
            };
            let errors = validate_post(&data, &groups()).unwrap_err();
            assert_eq!(errors.field("group"), [INVALID_CHOICE.to_string()]);
        }
    }

    #[test]
    fn test_non_image_upload_is_rejected() {
        let data = PostFormData {
            text: "hello".to_string(),
            image: encode(b"just some text"),
            image_name: "notes.txt".to_string(),
            ..Default::default()
        };
        let errors = validate_post(&data, &groups()).unwrap_err();
        assert_eq!(errors.field("image"), [INVALID_IMAGE.to_string()]);

        let data = PostFormData {
            text: "hello".to_string(),
            image: "%%%not-base64%%%".to_string(),
            ..Default::default()
        };
        assert!(validate_post(&data, &groups()).is_err());
    }

    #[test]
    fn test_sniff_image_format() {
        assert_eq!(sniff_image_format(SMALL_GIF), Some("gif"));
        assert_eq!(sniff_image_format(b"\x89PNG\r\n\x1a\nrest"), Some("png"));
        assert_eq!(sniff_image_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
        assert_eq!(sniff_image_format(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("webp"));
        assert_eq!(sniff_image_format(b"GIF"), None);
    }

    #[test]
    fn test_missing_image_name_uses_format() {
        let data = PostFormData {
            text: "hello".to_string(),
            image: encode(SMALL_GIF),
            ..Default::default()
        };
        let post = validate_post(&data, &[]).unwrap();
        assert_eq!(post.image.unwrap().name, "image.gif");
    }

    #[test]
    fn test_comment_validation() {
        assert_eq!(
            validate_comment(&CommentFormData { text: " nice ".to_string() }),
            Ok("nice".to_string())
        );
        let errors = validate_comment(&CommentFormData::default()).unwrap_err();
        assert_eq!(errors.field("text"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_form_context_lists_choices_and_hides_payload() {
        let data = PostFormData {
            text: "hi".to_string(),
            image: encode(SMALL_GIF),
            ..Default::default()
        };
        let context = post_form_context(&data, &FormErrors::default(), &groups());
        assert_eq!(context["groups"][0]["title"], "Cats");
        assert_eq!(context["fields"]["text"], "hi");
        assert!(context["fields"].get("image").is_none());
    }
}
