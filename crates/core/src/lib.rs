// ABOUTME: Core library for cardscope: finds the item list in a parsed payload and maps it to cards.
// ABOUTME: Provides collection detection, role suggestions, mapping validation and item normalization.

pub mod analysis;
pub mod choices;
pub mod detect;
pub mod error;
pub mod heuristics;
pub mod intent;
pub mod normalize;
pub mod options;
pub mod path;
pub mod quality;
pub mod roles;
pub mod suggest;
pub mod validate;

pub use analysis::{analyze, detect_format, root_type, Analysis, KeySummary, SourceFormat};
pub use choices::{build_role_choices, KeyOption, RoleChoice};
pub use detect::{find_main_collection, find_main_collection_with, CollectionCandidate, MainCollection};
pub use error::MappingError;
pub use heuristics::{looks_like_date, looks_like_link, looks_like_number, looks_like_url};
pub use intent::{normalize_intent, profile_for, roles_for_intent, section_for, IntentProfile, Section};
pub use normalize::{normalize_analysis, normalize_items, to_text, truncate, NormalizedItem};
pub use options::{DetectionConfig, NormalizeOptions, ValidationOptions};
pub use path::{display_path, resolve, resolve_key, Path, Step};
pub use quality::{mapping_quality, Grade, MappingQuality};
pub use roles::{RoleDefinition, RoleKind, ROLE_CATALOG, ROLE_PRIORITY};
pub use suggest::{suggest_roles, suggest_with, KeyScoreTable, RoleSuggestions, SuggestStrategy};
pub use validate::{clean_mapping, mapping_from_json, validate_mapping, RoleMapping, ValidationResult};
