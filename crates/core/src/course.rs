//! Course documents and their embedded chapters.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::DomainResult;
use crate::id::DocumentId;
use crate::json::{string_or_number, whole_as_integer};
use crate::validation::RequiredFields;

pub const DEFAULT_CHAPTER_CONTENT: &str = "none";
pub const DEFAULT_CHAPTER_DESCRIPTION: &str = "NA";
pub const DEFAULT_CHAPTER_VIDEO_LINK: &str = "NA";

/// A sub-unit of a course.
///
/// `id` is indexed across the whole `courses` collection: two different courses
/// cannot carry a chapter with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub content: String,
    pub description: String,
    pub video_link: String,
    #[serde(serialize_with = "whole_as_integer")]
    pub duration: f64,
}

/// Chapter as sent by API callers (every field optional until validated).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInput {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub video_link: Option<String>,
    pub duration: Option<f64>,
}

impl ChapterInput {
    fn into_chapter(self, index: usize, required: &mut RequiredFields) -> Option<Chapter> {
        let path = |field: &str| format!("chapters.{index}.{field}");

        let id = required.take(&path("id"), "id", self.id);
        let title = required.take(&path("title"), "title", self.title);
        let duration = required.take(&path("duration"), "duration", self.duration);

        Some(Chapter {
            id: id?,
            title: title?,
            content: self
                .content
                .unwrap_or_else(|| DEFAULT_CHAPTER_CONTENT.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DEFAULT_CHAPTER_DESCRIPTION.to_string()),
            video_link: self
                .video_link
                .unwrap_or_else(|| DEFAULT_CHAPTER_VIDEO_LINK.to_string()),
            duration: duration?,
        })
    }
}

/// Validate every chapter, recording all missing fields before giving up.
fn build_chapters(inputs: Vec<ChapterInput>, required: &mut RequiredFields) -> Option<Vec<Chapter>> {
    let chapters: Vec<Option<Chapter>> = inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| input.into_chapter(index, required))
        .collect();
    chapters.into_iter().collect()
}

/// A stored course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub course_id: String,
    pub category: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "whole_as_integer")]
    pub duration: f64,
    pub instructor_name: String,
    pub language: String,
    pub level: String,
    #[serde(serialize_with = "whole_as_integer")]
    pub price: f64,
    pub status: String,
    pub visibility: String,
}

/// Course payload for create (all required fields present) and update (any subset).
///
/// Unknown JSON fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub course_id: Option<String>,
    pub category: Option<String>,
    pub chapters: Option<Vec<ChapterInput>>,
    pub description: Option<String>,
    pub duration: Option<f64>,
    pub instructor_name: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub visibility: Option<String>,
}

impl CourseInput {
    /// Decode a request body. Type mismatches surface as validation errors.
    pub fn from_json(value: serde_json::Value) -> DomainResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

impl Course {
    /// Validate a full payload and build a new course document.
    pub fn create(id: DocumentId, input: CourseInput) -> DomainResult<Self> {
        let mut required = RequiredFields::new();

        let course_id = required.take("courseId", "courseId", input.course_id);
        let category = required.take("category", "category", input.category);
        let chapters = build_chapters(input.chapters.unwrap_or_default(), &mut required);
        let duration = required.take("duration", "duration", input.duration);
        let instructor_name = required.take("instructorName", "instructorName", input.instructor_name);
        let language = required.take("language", "language", input.language);
        let level = required.take("level", "level", input.level);
        let price = required.take("price", "price", input.price);
        let status = required.take("status", "status", input.status);
        let visibility = required.take("visibility", "visibility", input.visibility);

        let (
            Some(course_id),
            Some(category),
            Some(chapters),
            Some(duration),
            Some(instructor_name),
            Some(language),
            Some(level),
            Some(price),
            Some(status),
            Some(visibility),
        ) = (
            course_id,
            category,
            chapters,
            duration,
            instructor_name,
            language,
            level,
            price,
            status,
            visibility,
        )
        else {
            return Err(required.into_error("Course validation failed"));
        };

        Ok(Self {
            id,
            course_id,
            category,
            chapters,
            description: input.description,
            duration,
            instructor_name,
            language,
            level,
            price,
            status,
            visibility,
        })
    }

    /// Overwrite every field the patch carries; leave the rest untouched.
    ///
    /// A replacement `chapters` array is validated before anything is written,
    /// so a failed patch leaves the course unchanged.
    pub fn apply(&mut self, patch: CourseInput) -> DomainResult<()> {
        let chapters = match patch.chapters {
            Some(inputs) => {
                let mut required = RequiredFields::new();
                match build_chapters(inputs, &mut required) {
                    Some(chapters) if required.is_empty() => Some(chapters),
                    _ => return Err(required.into_error("Validation failed")),
                }
            }
            None => None,
        };

        if let Some(v) = patch.course_id {
            self.course_id = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = chapters {
            self.chapters = v;
        }
        if let Some(v) = patch.description {
            self.description = Some(v);
        }
        if let Some(v) = patch.duration {
            self.duration = v;
        }
        if let Some(v) = patch.instructor_name {
            self.instructor_name = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(v) = patch.level {
            self.level = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.visibility {
            self.visibility = v;
        }
        Ok(())
    }

    pub fn chapter_ids(&self) -> impl Iterator<Item = &str> {
        self.chapters.iter().map(|c| c.id.as_str())
    }
}

impl Document for Course {
    const COLLECTION: &'static str = "courses";
    const KEY_FIELD: &'static str = "courseId";

    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn key(&self) -> &str {
        &self.course_id
    }
}
