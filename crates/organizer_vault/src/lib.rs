//! Vault-side collaborators of the organizer: reading and rewriting frontmatter,
//! walking the vault, deleting import stubs, moving files and writing tag indexes.
//!
//! All placement decisions come from `organizer_core`; this crate only performs I/O.

pub mod cleanup;
pub mod document;
pub mod error;
pub mod frontmatter;
pub mod index;
pub mod mover;
pub mod organize;
pub mod walker;

pub use cleanup::{StubDetector, StubKind};
pub use document::{raw_tags, Document, RawTags, TagShape};
pub use error::{MoveError, VaultError};
pub use frontmatter::{render_document, split_frontmatter, Frontmatter, SplitDocument};
pub use index::{index_file_name, render_index, write_indexes, DocumentRef, IndexSummary, TagIndex};
pub use mover::move_document;
pub use organize::{organize_vault, Action, DocumentOutcome, Failure, OrganizeOptions, RunReport};
pub use walker::collect_markdown_files;
