//! Upsert logic shared by every level of the series tree.
//!
//! Each persisted entity splits into provider-owned attributes, replaced
//! wholesale on refresh, and locally owned fields that a refresh must keep.
//! [`Record`] captures that split once per entity type; [`pair`] finds the
//! stored row each fetched record belongs to and [`upsert`] is the one merge
//! rule applied to all of them.

use derive_more::Display;
use lnauto_metadata::models::{BookAttrs, ChapterAttrs, ReleaseAttrs, SeriesAttrs};
use lnauto_store::{Book, Chapter, GroupId, Release, ReleaseParent, Series, SeriesId};

/// What an upsert did to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ChangeKind {
    #[display("created")]
    Created,
    #[display("updated")]
    Updated,
    /// The record already matched the fetch; nothing needs writing.
    #[display("unchanged")]
    Unchanged,
}
impl ChangeKind {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Whether the record has to be written back.
    pub fn needs_write(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A persisted entity that can be created from, or refreshed with, fetched
/// attributes.
pub trait Record: Clone + PartialEq {
    type Attrs: PartialEq;
    /// What a new record is attached to.
    type Parent;

    fn create(parent: Self::Parent, attrs: Self::Attrs) -> Self;

    fn attrs(&self) -> &Self::Attrs;

    /// Whether two fetched records share this level's merge key.
    fn same_key(a: &Self::Attrs, b: &Self::Attrs) -> bool;

    /// Overwrite every provider-owned field with `attrs`, re-link to `parent`
    /// and clear the soft-delete flag. Locally owned fields stay untouched.
    fn refresh(&mut self, parent: Self::Parent, attrs: Self::Attrs);
}

/// Match fetched records to stored rows of the same parent, handing out each
/// stored row at most once.
///
/// A fetched record first claims an unclaimed row with the same key and the
/// same attributes, so an unchanged fetch lands on the rows it created. The
/// rest claim the first unclaimed row with the same key, in `stored` order.
/// Records left without a row are new. Keys may repeat (books without an
/// external id, chapters without a position); two of them never end up on
/// one row.
pub fn pair<R: Record>(stored: Vec<R>, fetched: &[&R::Attrs]) -> Vec<Option<R>> {
    let mut stored: Vec<Option<R>> = stored.into_iter().map(Some).collect();
    let mut paired: Vec<Option<R>> = fetched.iter().map(|_| None).collect();
    for (slot, &attrs) in paired.iter_mut().zip(fetched) {
        let identical = stored
            .iter_mut()
            .find(|row| matches!(row, Some(r) if R::same_key(r.attrs(), attrs) && r.attrs() == attrs));
        if let Some(row) = identical {
            *slot = row.take();
        }
    }
    for (slot, &attrs) in paired.iter_mut().zip(fetched) {
        if slot.is_some() {
            continue;
        }
        if let Some(row) = stored.iter_mut().find(|row| matches!(row, Some(r) if R::same_key(r.attrs(), attrs))) {
            *slot = row.take();
        }
    }
    paired
}

/// Merge fetched attributes into an existing record, or create a new one.
pub fn upsert<R: Record>(existing: Option<R>, parent: R::Parent, fetched: R::Attrs) -> (R, ChangeKind) {
    match existing {
        None => (R::create(parent, fetched), ChangeKind::Created),
        Some(existing) => {
            let mut record = existing.clone();
            record.refresh(parent, fetched);
            let change = if record == existing { ChangeKind::Unchanged } else { ChangeKind::Updated };
            (record, change)
        },
    }
}

/// A series is attached to the provider it came from and its resolved group.
#[derive(Debug, Clone)]
pub struct SeriesParent {
    pub source: String,
    pub group_id: GroupId,
}

impl Record for Series {
    type Attrs = SeriesAttrs;
    type Parent = SeriesParent;

    fn create(parent: SeriesParent, attrs: SeriesAttrs) -> Self {
        Series::new(parent.source, Some(parent.group_id), attrs)
    }

    fn attrs(&self) -> &SeriesAttrs {
        &self.attrs
    }

    fn same_key(a: &SeriesAttrs, b: &SeriesAttrs) -> bool {
        a.external_id == b.external_id
    }

    // `monitored` and `download_status` are local; the latter is re-derived
    // after the children are merged.
    fn refresh(&mut self, parent: SeriesParent, attrs: SeriesAttrs) {
        self.source = Some(parent.source);
        self.group_id = Some(parent.group_id);
        self.attrs = attrs;
        self.deleted = false;
    }
}

impl Record for Book {
    type Attrs = BookAttrs;
    type Parent = SeriesId;

    fn create(series_id: SeriesId, attrs: BookAttrs) -> Self {
        Book::new(series_id, attrs)
    }

    fn attrs(&self) -> &BookAttrs {
        &self.attrs
    }

    fn same_key(a: &BookAttrs, b: &BookAttrs) -> bool {
        a.external_id == b.external_id
    }

    // `monitored` and `downloaded` belong to the user.
    fn refresh(&mut self, series_id: SeriesId, attrs: BookAttrs) {
        self.series_id = series_id;
        self.attrs = attrs;
        self.deleted = false;
    }
}

impl Record for Chapter {
    type Attrs = ChapterAttrs;
    type Parent = SeriesId;

    fn create(series_id: SeriesId, attrs: ChapterAttrs) -> Self {
        Chapter::new(series_id, attrs)
    }

    fn attrs(&self) -> &ChapterAttrs {
        &self.attrs
    }

    // Chapters are matched by position, not by external id.
    fn same_key(a: &ChapterAttrs, b: &ChapterAttrs) -> bool {
        (a.number, a.volume) == (b.number, b.volume)
    }

    fn refresh(&mut self, series_id: SeriesId, attrs: ChapterAttrs) {
        self.series_id = series_id;
        self.attrs = attrs;
        self.deleted = false;
    }
}

impl Record for Release {
    type Attrs = ReleaseAttrs;
    type Parent = ReleaseParent;

    fn create(parent: ReleaseParent, attrs: ReleaseAttrs) -> Self {
        Release::new(parent, attrs)
    }

    fn attrs(&self) -> &ReleaseAttrs {
        &self.attrs
    }

    fn same_key(a: &ReleaseAttrs, b: &ReleaseAttrs) -> bool {
        a.external_id == b.external_id
    }

    fn refresh(&mut self, parent: ReleaseParent, attrs: ReleaseAttrs) {
        self.parent = parent;
        self.attrs = attrs;
        self.deleted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lnauto_metadata::Language;
    use lnauto_store::{BookId, DownloadStatus};

    #[test]
    fn test_create_when_missing() {
        let series_id = SeriesId::new();
        let (book, change) = upsert::<Book>(None, series_id, BookAttrs::new("b-1", "Volume 1"));
        assert_eq!(change, ChangeKind::Created);
        assert_eq!(book.series_id, series_id);
        assert!(book.monitored);
        assert!(!book.downloaded);
        assert!(!book.deleted);
    }

    #[test]
    fn test_book_keeps_user_fields() {
        let series_id = SeriesId::new();
        let mut existing = Book::new(series_id, BookAttrs::new("b-1", "Volume 1"));
        existing.monitored = false;
        existing.downloaded = true;
        let (book, change) = upsert(Some(existing.clone()), series_id, BookAttrs::new("b-1", "Volume One"));
        assert_eq!(change, ChangeKind::Updated);
        assert_eq!(book.id, existing.id);
        assert_eq!(book.attrs.title, "Volume One");
        assert!(!book.monitored);
        assert!(book.downloaded);
    }

    #[test]
    fn test_identical_fetch_is_unchanged() {
        let series_id = SeriesId::new();
        let existing = Book::new(series_id, BookAttrs::new("b-1", "Volume 1"));
        let (_, change) = upsert(Some(existing), series_id, BookAttrs::new("b-1", "Volume 1"));
        assert_eq!(change, ChangeKind::Unchanged);
        assert!(!change.needs_write());
    }

    #[test]
    fn test_refresh_restores_deleted() {
        let parent = ReleaseParent::Book(BookId::new());
        let mut existing = Release::new(parent, ReleaseAttrs::new("r-1", Language::En, None));
        existing.deleted = true;
        let (release, change) = upsert(Some(existing), parent, ReleaseAttrs::new("r-1", Language::En, None));
        assert_eq!(change, ChangeKind::Updated);
        assert!(!release.deleted);
    }

    #[test]
    fn test_fetched_fields_are_replaced_not_merged() {
        let series_id = SeriesId::new();
        let mut attrs = BookAttrs::new("b-1", "Volume 1");
        attrs.description = Some("Old blurb".to_string());
        let existing = Book::new(series_id, attrs);
        let (book, _) = upsert(Some(existing), series_id, BookAttrs::new("b-1", "Volume 1"));
        assert_eq!(book.attrs.description, None);
    }

    #[test]
    fn test_series_keeps_local_fields() {
        let group_id = GroupId::new();
        let parent = SeriesParent { source: "ranobedb".to_string(), group_id };
        let mut existing = Series::new("ranobedb", Some(group_id), SeriesAttrs::new("7", "Overlord"));
        existing.monitored = false;
        existing.download_status = DownloadStatus::Missing;
        let (series, change) = upsert(Some(existing.clone()), parent, SeriesAttrs::new("7", "Overlord (LN)"));
        assert_eq!(change, ChangeKind::Updated);
        assert_eq!(series.id, existing.id);
        assert!(!series.monitored);
        assert_eq!(series.download_status, DownloadStatus::Missing);
    }

    #[test]
    fn test_series_moves_to_resolved_group() {
        let old_group = GroupId::new();
        let new_group = GroupId::new();
        let existing = Series::new("ranobedb", Some(old_group), SeriesAttrs::new("7", "Overlord"));
        let parent = SeriesParent { source: "ranobedb".to_string(), group_id: new_group };
        let (series, change) = upsert(Some(existing), parent, SeriesAttrs::new("7", "Overlord"));
        assert_eq!(change, ChangeKind::Updated);
        assert_eq!(series.group_id, Some(new_group));
    }

    fn unnamed(title: &str) -> BookAttrs {
        BookAttrs { title: title.to_string(), ..BookAttrs::default() }
    }

    #[test]
    fn test_pair_never_reuses_a_row() {
        let series_id = SeriesId::new();
        let (a, b) = (unnamed("Side Story A"), unnamed("Side Story B"));
        assert_eq!(pair::<Book>(Vec::new(), &[&a, &b]), [None, None]);

        let stored = vec![Book::new(series_id, a.clone()), Book::new(series_id, b.clone())];
        let ids: Vec<_> = stored.iter().map(|book| book.id).collect();
        // Order of the fetch does not matter for identical records.
        let paired = pair(stored.clone(), &[&b, &a]);
        assert_eq!(paired[0].as_ref().map(|book| book.id), Some(ids[1]));
        assert_eq!(paired[1].as_ref().map(|book| book.id), Some(ids[0]));

        // A renamed record takes whichever keyless row is left.
        let renamed = unnamed("Side Story B (Revised)");
        let paired = pair(stored.clone(), &[&renamed, &a]);
        assert_eq!(paired[0].as_ref().map(|book| book.id), Some(ids[1]));
        assert_eq!(paired[1].as_ref().map(|book| book.id), Some(ids[0]));

        // More fetched than stored: the extra one is new.
        let c = unnamed("Side Story C");
        let paired = pair(stored, &[&a, &b, &c]);
        assert!(paired[2].is_none());
    }

    #[test]
    fn test_pair_respects_keys() {
        let parent = ReleaseParent::Book(BookId::new());
        let stored = vec![Release::new(parent, ReleaseAttrs::new("r-1", Language::En, None))];
        let other = ReleaseAttrs::new("r-2", Language::En, None);
        assert_eq!(pair(stored.clone(), &[&other]), [None]);
        let updated = ReleaseAttrs::new("r-1", Language::Ja, None);
        assert_eq!(pair(stored.clone(), &[&updated]), [Some(stored[0].clone())]);
    }

    #[test]
    fn test_chapters_pair_by_position() {
        let series_id = SeriesId::new();
        let stored = vec![Chapter::new(series_id, ChapterAttrs::new("Interlude", None, None))];
        let moved = ChapterAttrs::new("Interlude", Some(2), None);
        assert_eq!(pair(stored.clone(), &[&moved]), [None]);
        let retitled = ChapterAttrs::new("Interlude II", None, None);
        assert_eq!(pair(stored.clone(), &[&retitled]), [Some(stored[0].clone())]);
    }
}
