mod common;

use chrono::{DateTime, Datelike, Utc};
use common::{new_note, owner, utc, TestCipher};
use plannote_core::db::open_db_in_memory;
use plannote_core::{
    BlockType, CalendarId, ContentBlock, ErrorKind, Note, NoteHeader, NoteId, NotePatch,
    NoteRepository, NoteService, OwnerId, RepoError, RepoResult, SqliteNoteRepository,
};

fn create_on(
    service: &mut NoteService<impl NoteRepository, TestCipher>,
    owner_id: &OwnerId,
    date: DateTime<Utc>,
) -> NoteId {
    service
        .create_note(
            owner_id,
            new_note(
                "Standup",
                "Team",
                vec![ContentBlock::new(BlockType::Text, "agenda")],
                date,
            ),
        )
        .unwrap()
}

#[test]
fn april_28_every_two_days_creates_one_copy_on_april_30() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, TestCipher::default());
    let alice = owner("alice");
    let source = create_on(&mut service, &alice, utc(2024, 4, 28, 0, 0));

    let created = service.duplicate_to_end_of_month(source, &alice, 2).unwrap();
    assert_eq!(created, 1);

    let dates: Vec<_> = service
        .list_notes(&alice)
        .unwrap()
        .into_iter()
        .map(|summary| summary.assigned_date)
        .collect();
    assert_eq!(dates, vec![utc(2024, 4, 28, 0, 0), utc(2024, 4, 30, 0, 0)]);
}

#[test]
fn last_day_of_month_creates_nothing_for_any_interval() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, TestCipher::default());
    let alice = owner("alice");
    let source = create_on(&mut service, &alice, utc(2024, 4, 30, 18, 0));

    for interval in 1..=7 {
        assert_eq!(
            service
                .duplicate_to_end_of_month(source, &alice, interval)
                .unwrap(),
            0
        );
    }
    assert_eq!(service.list_notes(&alice).unwrap().len(), 1);
}

#[test]
fn invalid_interval_is_rejected_and_creates_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let mut service = NoteService::new(repo, TestCipher::default());
    let alice = owner("alice");
    let source = create_on(&mut service, &alice, utc(2024, 4, 1, 0, 0));

    for interval in [0, 8, -3] {
        let err = service
            .duplicate_to_end_of_month(source, &alice, interval)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.public_message().contains("1-7"));
    }
    assert_eq!(service.repository().count_notes().unwrap(), 1);
}

#[test]
fn copies_share_sealed_fields_verbatim_and_start_not_done() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&mut conn).unwrap();
    let cipher = TestCipher::default();
    let mut service = NoteService::new(repo, &cipher);
    let alice = owner("alice");

    let mut request = new_note(
        "Standup",
        "Team",
        vec![ContentBlock::new(BlockType::Code, serde_json::json!({"k": 1}))],
        utc(2024, 2, 1, 9, 45),
    );
    request.calendar_id = Some("work".to_string());
    let source_id = service.create_note(&alice, request).unwrap();
    service.toggle_done(source_id, &alice).unwrap();
    service
        .update_note(
            source_id,
            &alice,
            NotePatch {
                subject: Some("Team sync".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap();

    let encrypt_calls = cipher.encrypt_calls();
    let created = service
        .duplicate_to_end_of_month(source_id, &alice, 7)
        .unwrap();
    assert_eq!(created, 4);
    assert_eq!(cipher.encrypt_calls(), encrypt_calls);

    let source = service.repository().get_note(source_id).unwrap().unwrap();
    let copies: Vec<Note> = service
        .repository()
        .list_notes_by_owner(&alice)
        .unwrap()
        .into_iter()
        .filter(|note| note.id != source_id)
        .collect();

    let days: Vec<u32> = copies.iter().map(|note| note.assigned_date.day()).collect();
    assert_eq!(days, vec![8, 15, 22, 29]);
    for copy in &copies {
        assert_eq!(copy.title, source.title);
        assert_eq!(copy.subject, source.subject);
        assert_eq!(copy.content_blocks, source.content_blocks);
        assert_eq!(copy.calendar_id, source.calendar_id);
        assert_eq!(copy.owner_id, alice);
        assert!(!copy.is_done);
        assert_eq!(copy.assigned_date.time(), source.assigned_date.time());
    }

    let detail = service.get_note(copies[0].id, &alice).unwrap();
    assert_eq!(detail.subject, "Team sync");
}

/// Delegates to SQLite but fails every create once its budget is spent.
struct FlakyRepository<'conn> {
    inner: SqliteNoteRepository<'conn>,
    creates_left: usize,
}

impl NoteRepository for FlakyRepository<'_> {
    fn create_note(&mut self, note: &Note) -> RepoResult<NoteId> {
        if self.creates_left == 0 {
            return Err(RepoError::InvalidData("simulated write failure".to_string()));
        }
        self.creates_left -= 1;
        self.inner.create_note(note)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.inner.get_note(id)
    }

    fn list_notes_by_owner(&self, owner: &OwnerId) -> RepoResult<Vec<Note>> {
        self.inner.list_notes_by_owner(owner)
    }

    fn list_note_headers(
        &self,
        owner: &OwnerId,
        calendar: Option<&CalendarId>,
    ) -> RepoResult<Vec<NoteHeader>> {
        self.inner.list_note_headers(owner, calendar)
    }

    fn save_note(&mut self, note: &Note) -> RepoResult<()> {
        self.inner.save_note(note)
    }

    fn delete_note(&mut self, id: NoteId) -> RepoResult<()> {
        self.inner.delete_note(id)
    }
}

#[test]
fn failure_midway_keeps_saved_copies_and_reports_internal_error() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = FlakyRepository {
        inner: SqliteNoteRepository::try_new(&mut conn).unwrap(),
        creates_left: 3,
    };
    let mut service = NoteService::new(repo, TestCipher::default());
    let alice = owner("alice");
    let source = create_on(&mut service, &alice, utc(2024, 4, 1, 0, 0));

    let err = service
        .duplicate_to_end_of_month(source, &alice, 7)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.public_message(), "Internal error");

    let days: Vec<u32> = service
        .list_notes(&alice)
        .unwrap()
        .into_iter()
        .map(|summary| summary.assigned_date.day())
        .collect();
    assert_eq!(days, vec![1, 8, 15]);
}

#[test]
fn persistence_failure_on_create_is_internal_error() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = FlakyRepository {
        inner: SqliteNoteRepository::try_new(&mut conn).unwrap(),
        creates_left: 0,
    };
    let mut service = NoteService::new(repo, TestCipher::default());
    let alice = owner("alice");

    let err = service
        .create_note(&alice, new_note("t", "s", Vec::new(), utc(2024, 4, 1, 0, 0)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(service.list_notes(&alice).unwrap().is_empty());
}
