//! Video record model and field validation
//!
//! Client-settable content is validated in one place for both creation and
//! partial updates. Identity and timestamps are owned by the store.

use crate::id::VideoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Wire names of validated fields, in reporting order
const FIELD_ORDER: [&str; 7] = [
    "title",
    "description",
    "videoUrl",
    "thumbnailUrl",
    "controls",
    "transformation",
    "likes",
];

fn default_controls() -> bool {
    true
}

/// Rendering hints passed to the media CDN
///
/// Signed, so negative hints are reported by validation rather than parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    /// 1-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<i64>,
}

impl Transformation {
    fn is_valid(&self) -> bool {
        self.height.map_or(true, |h| h > 0)
            && self.width.map_or(true, |w| w > 0)
            && self.quality.map_or(true, |q| (1..=100).contains(&q))
    }
}

/// A persisted video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    #[serde(default = "default_controls")]
    pub controls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
    #[serde(default)]
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// Client-settable content of this record
    pub fn fields(&self) -> VideoFields {
        VideoFields {
            title: self.title.clone(),
            description: self.description.clone(),
            video_url: self.video_url.clone(),
            thumbnail_url: self.thumbnail_url.clone(),
            controls: self.controls,
            transformation: self.transformation,
            likes: self.likes,
        }
    }
}

/// Fully resolved client-settable content, validated before it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFields {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub controls: bool,
    pub transformation: Option<Transformation>,
    pub likes: i64,
}

impl VideoFields {
    /// Check required-field and range rules
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut invalid = Vec::new();
        if self.title.trim().is_empty() {
            invalid.push("title");
        }
        if self.video_url.trim().is_empty() {
            invalid.push("videoUrl");
        }
        if self.thumbnail_url.trim().is_empty() {
            invalid.push("thumbnailUrl");
        }
        if self.transformation.is_some_and(|t| !t.is_valid()) {
            invalid.push("transformation");
        }
        if self.likes < 0 {
            invalid.push("likes");
        }
        ValidationError::check(invalid)
    }
}

/// Creation payload
///
/// Every field is optional on the wire so that missing required fields are
/// reported together as a validation error rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
}

impl NewVideo {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        video_url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            video_url: Some(video_url.into()),
            thumbnail_url: Some(thumbnail_url.into()),
            ..Self::default()
        }
    }

    pub fn with_controls(mut self, controls: bool) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self
    }

    /// Resolve defaults and validate
    pub fn into_fields(self) -> Result<VideoFields, ValidationError> {
        let mut invalid = Vec::new();
        if self.description.is_none() {
            invalid.push("description");
        }

        let fields = VideoFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            video_url: self.video_url.unwrap_or_default(),
            thumbnail_url: self.thumbnail_url.unwrap_or_default(),
            controls: self.controls.unwrap_or(true),
            transformation: self.transformation,
            likes: self.likes.unwrap_or(0),
        };

        if let Err(e) = fields.validate() {
            invalid.extend(e.fields.iter().map(String::as_str).filter_map(field_name));
        }
        ValidationError::check(invalid)?;
        Ok(fields)
    }
}

/// A top-level field of a partial update: absent, explicit `null`, or a value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Missing,
    Null,
    Value(T),
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Field::Null, Field::Value))
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => serializer.serialize_some(v),
            Field::Missing | Field::Null => serializer.serialize_none(),
        }
    }
}

/// Partial update payload
///
/// Supplied fields replace the stored value wholesale; `transformation` is
/// never merged key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub title: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub description: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub video_url: Field<String>,
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub thumbnail_url: Field<String>,
    /// `null` restores the default (`true`)
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub controls: Field<bool>,
    /// `null` removes the transformation
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub transformation: Field<Transformation>,
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub likes: Field<i64>,
}

impl VideoPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Field::Value(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Field::Value(description.into());
        self
    }

    pub fn video_url(mut self, video_url: impl Into<String>) -> Self {
        self.video_url = Field::Value(video_url.into());
        self
    }

    pub fn thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = Field::Value(thumbnail_url.into());
        self
    }

    pub fn controls(mut self, controls: bool) -> Self {
        self.controls = Field::Value(controls);
        self
    }

    pub fn transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Field::Value(transformation);
        self
    }

    pub fn clear_transformation(mut self) -> Self {
        self.transformation = Field::Null;
        self
    }

    pub fn likes(mut self, likes: i64) -> Self {
        self.likes = Field::Value(likes);
        self
    }

    /// Apply this patch on top of `current` and validate the result
    pub fn apply(self, current: &VideoRecord) -> Result<VideoFields, ValidationError> {
        let mut invalid = Vec::new();

        let fields = VideoFields {
            title: required(self.title, &current.title, "title", &mut invalid),
            description: required(self.description, &current.description, "description", &mut invalid),
            video_url: required(self.video_url, &current.video_url, "videoUrl", &mut invalid),
            thumbnail_url: required(self.thumbnail_url, &current.thumbnail_url, "thumbnailUrl", &mut invalid),
            controls: match self.controls {
                Field::Missing => current.controls,
                Field::Null => default_controls(),
                Field::Value(v) => v,
            },
            transformation: match self.transformation {
                Field::Missing => current.transformation,
                Field::Null => None,
                Field::Value(t) => Some(t),
            },
            likes: required(self.likes, &current.likes, "likes", &mut invalid),
        };

        if let Err(e) = fields.validate() {
            invalid.extend(e.fields.iter().map(String::as_str).filter_map(field_name));
        }
        ValidationError::check(invalid)?;
        Ok(fields)
    }
}

fn required<T: Clone>(
    field: Field<T>,
    current: &T,
    name: &'static str,
    invalid: &mut Vec<&'static str>,
) -> T {
    match field {
        Field::Missing => current.clone(),
        Field::Null => {
            invalid.push(name);
            current.clone()
        }
        Field::Value(v) => v,
    }
}

fn field_name(name: &str) -> Option<&'static str> {
    FIELD_ORDER.iter().copied().find(|f| *f == name)
}

/// Payload failed required-field or range rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Offending fields by wire name, in a stable order without duplicates
    pub fields: Vec<String>,
}

impl ValidationError {
    fn check(mut invalid: Vec<&'static str>) -> Result<(), Self> {
        if invalid.is_empty() {
            return Ok(());
        }
        invalid.sort_by_key(|name| FIELD_ORDER.iter().position(|f| f == name));
        invalid.dedup();
        Err(Self {
            fields: invalid.into_iter().map(String::from).collect(),
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing or invalid fields: {}", self.fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}
