use super::{BookId, ChapterId, ReleaseId};
use lnauto_metadata::models::ReleaseAttrs;

/// The single entity a [`Release`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseParent {
    Book(BookId),
    Chapter(ChapterId),
}
impl ReleaseParent {
    pub fn book_id(&self) -> Option<BookId> {
        match self {
            Self::Book(id) => Some(*id),
            Self::Chapter(_) => None,
        }
    }

    pub fn chapter_id(&self) -> Option<ChapterId> {
        match self {
            Self::Book(_) => None,
            Self::Chapter(id) => Some(*id),
        }
    }
}
impl From<BookId> for ReleaseParent {
    fn from(id: BookId) -> Self {
        Self::Book(id)
    }
}
impl From<ChapterId> for ReleaseParent {
    fn from(id: ChapterId) -> Self {
        Self::Chapter(id)
    }
}

/// A concrete edition of a book or chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: ReleaseId,
    pub parent: ReleaseParent,
    pub attrs: ReleaseAttrs,
    pub deleted: bool,
}
impl Release {
    pub fn new(parent: impl Into<ReleaseParent>, attrs: ReleaseAttrs) -> Self {
        Self { id: ReleaseId::new(), parent: parent.into(), attrs, deleted: false }
    }

    pub fn external_id(&self) -> Option<&str> {
        self.attrs.external_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_accessors() {
        let book = BookId::new();
        let parent = ReleaseParent::from(book);
        assert_eq!(parent.book_id(), Some(book));
        assert_eq!(parent.chapter_id(), None);
        let chapter = ChapterId::new();
        let parent = ReleaseParent::from(chapter);
        assert_eq!(parent.book_id(), None);
        assert_eq!(parent.chapter_id(), Some(chapter));
    }
}
