//! Integration tests for the create-or-join flow against a scripted
//! in-memory directory.

use std::sync::Mutex;

use parlor_protocol::{ClientId, RoomId};
use parlor_room::{
    CreateOutcome, DirectoryError, RoomDirectory, RoomError, RoomSummary, Stage,
    resolve_room,
};

// =========================================================================
// Scripted directory
// =========================================================================

#[derive(Clone)]
enum Step<T> {
    Ok(T),
    Fail,
}

impl<T: Clone> Step<T> {
    fn run(&self) -> Result<T, DirectoryError> {
        match self {
            Step::Ok(value) => Ok(value.clone()),
            Step::Fail => Err(DirectoryError::Request("scripted failure".into())),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Calls {
    create: Vec<String>,
    lookup: Vec<String>,
    join: Vec<(ClientId, RoomId)>,
}

struct ScriptedDirectory {
    create: Step<CreateOutcome>,
    lookup: Step<RoomId>,
    join: Step<()>,
    calls: Mutex<Calls>,
}

impl ScriptedDirectory {
    fn new(create: Step<CreateOutcome>, lookup: Step<RoomId>, join: Step<()>) -> Self {
        Self {
            create,
            lookup,
            join,
            calls: Mutex::new(Calls::default()),
        }
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }
}

impl RoomDirectory for ScriptedDirectory {
    async fn create_room(&self, name: &str) -> Result<CreateOutcome, DirectoryError> {
        self.calls().create.push(name.to_owned());
        self.create.run()
    }

    async fn lookup_room_by_name(&self, name: &str) -> Result<RoomId, DirectoryError> {
        self.calls().lookup.push(name.to_owned());
        self.lookup.run()
    }

    async fn join_room(
        &self,
        client_id: &ClientId,
        room_id: &RoomId,
    ) -> Result<(), DirectoryError> {
        self.calls().join.push((client_id.clone(), room_id.clone()));
        self.join.run()
    }

    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, DirectoryError> {
        Ok(Vec::new())
    }
}

fn cid(id: &str) -> ClientId {
    ClientId::new(id)
}

fn rid(id: &str) -> RoomId {
    RoomId::new(id)
}

// =========================================================================
// Happy paths
// =========================================================================

#[tokio::test]
async fn test_resolve_created_room_joins_without_lookup() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Created(rid("r9"))),
        Step::Fail,
        Step::Ok(()),
    );

    let room = resolve_room(&dir, &cid("c1"), "lobby").await.unwrap();

    assert_eq!(room, rid("r9"));
    let calls = dir.calls();
    assert_eq!(calls.create, vec!["lobby".to_string()]);
    assert!(calls.lookup.is_empty(), "no lookup after 201");
    assert_eq!(calls.join, vec![(cid("c1"), rid("r9"))]);
}

#[tokio::test]
async fn test_resolve_rejected_create_falls_back_to_single_lookup() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Rejected { status: 409 }),
        Step::Ok(rid("r-general")),
        Step::Ok(()),
    );

    let room = resolve_room(&dir, &cid("c1"), "general").await.unwrap();

    assert_eq!(room, rid("r-general"));
    let calls = dir.calls();
    assert_eq!(calls.create, vec!["general".to_string()], "exactly one create");
    assert_eq!(calls.lookup, vec!["general".to_string()], "exactly one lookup");
    assert_eq!(calls.join, vec![(cid("c1"), rid("r-general"))]);
}

#[tokio::test]
async fn test_resolve_sends_trimmed_name() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Created(rid("r1"))),
        Step::Fail,
        Step::Ok(()),
    );

    resolve_room(&dir, &cid("c1"), "  lobby  ").await.unwrap();

    assert_eq!(dir.calls().create, vec!["lobby".to_string()]);
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_resolve_blank_name_makes_no_calls() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Created(rid("r1"))),
        Step::Ok(rid("r1")),
        Step::Ok(()),
    );

    let result = resolve_room(&dir, &cid("c1"), "   ").await;

    assert!(matches!(result, Err(RoomError::InvalidRoomName)));
    assert_eq!(*dir.calls(), Calls::default());
}

#[tokio::test]
async fn test_resolve_create_request_failure_stops_at_create() {
    let dir = ScriptedDirectory::new(Step::Fail, Step::Ok(rid("r1")), Step::Ok(()));

    let result = resolve_room(&dir, &cid("c1"), "lobby").await;

    assert!(matches!(
        result,
        Err(RoomError::ResolutionFailed { stage: Stage::Create, .. })
    ));
    let calls = dir.calls();
    assert!(calls.lookup.is_empty());
    assert!(calls.join.is_empty());
}

#[tokio::test]
async fn test_resolve_lookup_failure_stops_before_join() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Rejected { status: 400 }),
        Step::Fail,
        Step::Ok(()),
    );

    let result = resolve_room(&dir, &cid("c1"), "lobby").await;

    assert!(matches!(
        result,
        Err(RoomError::ResolutionFailed { stage: Stage::Lookup, .. })
    ));
    assert!(dir.calls().join.is_empty());
}

#[tokio::test]
async fn test_resolve_join_failure_reports_join_stage() {
    let dir = ScriptedDirectory::new(
        Step::Ok(CreateOutcome::Created(rid("r1"))),
        Step::Fail,
        Step::Fail,
    );

    let result = resolve_room(&dir, &cid("c1"), "lobby").await;

    assert!(matches!(
        result,
        Err(RoomError::ResolutionFailed { stage: Stage::Join, .. })
    ));
    assert_eq!(dir.calls().join.len(), 1);
}
