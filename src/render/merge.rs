//! Concatenation of single-page PDFs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use thiserror::Error;

/// Page attributes a page may inherit from its page-tree ancestors.
const INHERITABLE: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Upper bound on page-tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no pages to merge")]
    Empty,

    #[error("failed to load `{}`", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("`{}` contains no pages", .0.display())]
    NoPages(PathBuf),

    #[error("failed to write `{}`: {message}", .path.display())]
    Save { path: PathBuf, message: String },
}

/// Concatenates rendered pages into one document.
pub trait DocumentMerger: Sync {
    /// Write `inputs`, in order, into `output`. An empty input list is an error.
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError>;
}

/// In-process merger built on `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfMerger;

impl DocumentMerger for LopdfMerger {
    fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::Empty);
        }

        let mut merged = Document::with_version("1.5");
        let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut kids: Vec<ObjectId> = Vec::new();
        let mut max_id = 1;

        for path in inputs {
            let mut doc = Document::load(path).map_err(|source| MergeError::Load {
                path: path.clone(),
                source,
            })?;
            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;

            let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
            if pages.is_empty() {
                return Err(MergeError::NoPages(path.clone()));
            }
            for &page_id in &pages {
                flatten_inherited(&mut doc, page_id);
            }

            objects.extend(
                doc.objects
                    .into_iter()
                    .filter(|(_, object)| !matches!(type_name(object), Some(b"Catalog" | b"Pages"))),
            );
            kids.extend(pages);
        }

        merged.objects = objects;
        merged.max_id = max_id;
        let pages_id = merged.new_object_id();

        for &kid in &kids {
            if let Ok(page) = merged.get_object_mut(kid).and_then(|o| o.as_dict_mut()) {
                page.set("Parent", pages_id);
            }
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids.into_iter().map(Object::from).collect::<Vec<_>>(),
            "Count" => count,
        };
        merged.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);
        merged.compress();

        merged
            .save(output)
            .map(|_| ())
            .map_err(|err| MergeError::Save {
                path: output.to_path_buf(),
                message: err.to_string(),
            })
    }
}

/// `/Type` of a dictionary object.
fn type_name(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// Copy inherited page attributes onto the page itself, so the page survives
/// being re-parented under a fresh page tree.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return;
    };
    let inherited: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| inherited_attr(doc, page, key).map(|value| (*key, value)))
        .collect();

    if let Ok(page) = doc.get_object_mut(page_id).and_then(|o| o.as_dict_mut()) {
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
}

fn inherited_attr(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").ok()?.as_reference().ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}
