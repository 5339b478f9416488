//! Faces and match membership — association data written by the face
//! grouping job. The person store only reads it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pixel rectangle of a detected face within its source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
  pub x:      i64,
  pub y:      i64,
  pub width:  i64,
  pub height: i64,
}

/// A single face detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
  pub face_id:      String,
  /// `None` while the face has not been assigned to anyone.
  #[serde(default)]
  pub person_id:    Option<Uuid>,
  /// The image or frame the face was detected in.
  pub image_name:   String,
  #[serde(default)]
  pub face_path:    Option<String>,
  #[serde(default)]
  pub confidence:   Option<f64>,
  #[serde(default)]
  pub bounding_box: Option<BoundingBox>,
}

/// States that `person_id` appears in match `match_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMember {
  pub match_id:  String,
  pub person_id: Uuid,
}
