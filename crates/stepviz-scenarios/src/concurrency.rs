//! Concurrencia entre dos transacciones: visibilidad MVCC, espera por lock
//! exclusivo y un deadlock resuelto abortando a la víctima.
use serde::Serialize;
use stepviz_core::{step, FnStep, Highlight, Scenario, StepOutcome, StepTag};
use stepviz_domain::{choose_victim, LockOutcome, LockTable, TxId, VersionStore};

pub const MVCC_ROW_ID: u32 = 1;
pub const LOCKED_ROW: &str = "Row_5";

fn tag(name: &str) -> StepTag {
    StepTag::Other(name.to_string())
}

/// Lectura registrada: quién leyó, qué valor y de qué versión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadRecord {
    pub tx: TxId,
    pub value: i64,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MvccBag {
    pub row: VersionStore,
    pub active: Vec<TxId>,
    pub reads: Vec<ReadRecord>,
}

fn read_step(id: &str, tx: TxId) -> FnStep<MvccBag> {
    step(id, move |bag: &MvccBag| {
        let mut next = bag.clone();
        let Some(v) = bag.row.read(tx) else {
            return StepOutcome::new(next, format!("{tx} SELECT"), "No visible version.");
        };
        next.reads.push(ReadRecord { tx,
                                     value: v.value,
                                     version: v.version });
        let text = if bag.row.versions().iter().any(|x| !x.committed && x.created_by != tx) {
            format!("{tx} reads value {} from v{}: the newer version is still uncommitted and invisible to it.",
                    v.value, v.version)
        } else {
            format!("{tx} reads value {} from v{}, the latest committed version.", v.value, v.version)
        };
        StepOutcome::new(next, format!("{tx} SELECT"), text)
    }).tagged(StepTag::Scan)
      .highlight(Highlight::new("sessions", [tx.to_string()]))
}

/// TxA actualiza la fila mientras TxB lee antes y después del COMMIT.
pub fn mvcc() -> Scenario<MvccBag> {
    let initial = MvccBag { row: VersionStore::committed_row(MVCC_ROW_ID, 100),
                            active: Vec::new(),
                            reads: Vec::new() };

    let begin = step("txa_begin", |bag: &MvccBag| {
                    let mut next = bag.clone();
                    next.active.push(TxId::TxA);
                    StepOutcome::new(next, "TxA BEGIN", "Transaction A starts; it works on its own snapshot.")
                }).tagged(tag("begin"))
                  .highlight(Highlight::new("sessions", ["TxA"]));

    let update = step("txa_update", |bag: &MvccBag| {
                     let mut next = bag.clone();
                     let v = next.row.update(TxId::TxA, 200).clone();
                     let text = format!("UPDATE creates v{} with value {}. Only TxA can see it until COMMIT.",
                                        v.version, v.value);
                     StepOutcome::new(next, "TxA UPDATE", text)
                 }).tagged(tag("write"))
                   .highlight(Highlight::new("versions", ["v2"]));

    let commit = step("txa_commit", |bag: &MvccBag| {
                     let mut next = bag.clone();
                     next.row.commit(TxId::TxA);
                     next.active.retain(|t| *t != TxId::TxA);
                     StepOutcome::new(next,
                                      "TxA COMMIT",
                                      "v2 becomes the current version for everyone; v1 is kept as history.")
                 }).tagged(tag("commit"))
                   .highlight(Highlight::new("versions", ["v1", "v2"]));

    Scenario::builder("mvcc", initial)
        .title("MVCC: readers never block writers")
        .intro("Ready", "Row 1 holds value 100 (v1, committed by System).")
        .step(begin)
        .step(update)
        .step(read_step("txb_read_before_commit", TxId::TxB))
        .step(commit)
        .step(read_step("txb_read_after_commit", TxId::TxB))
        .build()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockingBag {
    pub locks: LockTable,
    pub value: i64,
    pub committed: Vec<TxId>,
}

fn acquire_narration(tx: TxId, resource: &str, outcome: &LockOutcome) -> String {
    match outcome {
        LockOutcome::Granted => format!("{tx} acquires the exclusive lock on {resource}."),
        LockOutcome::AlreadyHeld => format!("{tx} already holds the lock on {resource}."),
        LockOutcome::Waiting { holder } => format!("{resource} is locked by {holder}; {tx} must wait."),
    }
}

fn handoff_narration(handoffs: &[(String, Option<TxId>)]) -> String {
    handoffs.iter()
            .map(|(r, next)| match next {
                Some(n) => format!("{r} released and granted to {n}."),
                None => format!("{r} released."),
            })
            .collect::<Vec<_>>()
            .join(" ")
}

fn locking_commit(id: &str, tx: TxId, delta: i64) -> FnStep<LockingBag> {
    step(id, move |bag: &LockingBag| {
        let mut next = bag.clone();
        next.value += delta;
        next.committed.push(tx);
        let handoffs = next.locks.release_all(tx);
        let text = format!("{tx} adds {delta} (value now {}) and commits. {}",
                           next.value,
                           handoff_narration(&handoffs));
        StepOutcome::new(next, format!("{tx} COMMIT"), text)
    }).tagged(tag("commit"))
      .highlight(Highlight::new("locks", [LOCKED_ROW]))
}

/// TxB espera el lock de `Row_5` hasta que TxA confirma.
pub fn locking() -> Scenario<LockingBag> {
    let initial = LockingBag { locks: LockTable::new(),
                               value: 50,
                               committed: Vec::new() };

    let request = |id: &str, tx: TxId, wait_tag: &str| {
        let wait_tag = wait_tag.to_string();
        step(id, move |bag: &LockingBag| {
            let mut next = bag.clone();
            let outcome = next.locks.acquire(tx, LOCKED_ROW);
            let text = acquire_narration(tx, LOCKED_ROW, &outcome);
            StepOutcome::new(next, format!("{tx} UPDATE {LOCKED_ROW}"), text)
        }).tagged(tag(&wait_tag))
          .highlight(Highlight::new("locks", [LOCKED_ROW]))
    };

    Scenario::builder("locking", initial)
        .title("Row locks: writers wait for writers")
        .intro("Ready", format!("{LOCKED_ROW} holds value 50."))
        .step(request("txa_lock", TxId::TxA, "lock"))
        .step(request("txb_request", TxId::TxB, "wait"))
        .step(locking_commit("txa_commit", TxId::TxA, 10))
        .step(locking_commit("txb_commit", TxId::TxB, 20))
        .build()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadlockBag {
    pub locks: LockTable,
    pub cycle: Option<Vec<TxId>>,
    pub victim: Option<TxId>,
    pub rolled_back: Vec<TxId>,
}

fn deadlock_lock(id: &str, tx: TxId, resource: &'static str) -> FnStep<DeadlockBag> {
    step(id, move |bag: &DeadlockBag| {
        let mut next = bag.clone();
        let outcome = next.locks.acquire(tx, resource);
        let text = acquire_narration(tx, resource, &outcome);
        StepOutcome::new(next, format!("{tx} locks {resource}"), text)
    }).tagged(tag("lock"))
      .highlight(Highlight::new("locks", [resource]))
}

/// TxA y TxB se bloquean en cruz sobre X e Y; el detector aborta a TxB.
pub fn deadlock() -> Scenario<DeadlockBag> {
    let initial = DeadlockBag { locks: LockTable::new(),
                                cycle: None,
                                victim: None,
                                rolled_back: Vec::new() };

    let detect = step("detect_deadlock", |bag: &DeadlockBag| {
                     let mut next = bag.clone();
                     next.cycle = bag.locks.wait_for_cycle();
                     next.victim = next.cycle.as_deref().and_then(choose_victim);
                     let text = match (&next.cycle, next.victim) {
                         (Some(cycle), Some(victim)) => {
                             let path: Vec<String> = cycle.iter().map(TxId::to_string).collect();
                             format!("Wait-for cycle {} -> {}. The youngest transaction, {victim}, is chosen as \
                                      the victim.",
                                     path.join(" -> "),
                                     path.first().cloned().unwrap_or_default())
                         }
                         _ => "No cycle in the wait-for graph.".to_string(),
                     };
                     StepOutcome::new(next, "Deadlock Detected", text)
                 }).tagged(StepTag::Terminate)
                   .highlight(Highlight::new("locks", ["X", "Y"]));

    let rollback = step("rollback_victim", |bag: &DeadlockBag| {
                       let mut next = bag.clone();
                       let Some(victim) = bag.victim else {
                           return StepOutcome::new(next, "Rollback", "No victim to roll back.");
                       };
                       let handoffs = next.locks.release_all(victim);
                       next.rolled_back.push(victim);
                       let text = format!("{victim} is rolled back. {}", handoff_narration(&handoffs));
                       StepOutcome::new(next, format!("{victim} ROLLBACK"), text)
                   }).tagged(tag("rollback"));

    Scenario::builder("deadlock", initial)
        .title("Deadlock detection")
        .intro("Ready", "Two transactions will lock resources X and Y in opposite order.")
        .step(deadlock_lock("txa_lock_x", TxId::TxA, "X"))
        .step(deadlock_lock("txb_lock_y", TxId::TxB, "Y"))
        .step(deadlock_lock("txa_wait_y", TxId::TxA, "Y"))
        .step(deadlock_lock("txb_wait_x", TxId::TxB, "X"))
        .step(detect)
        .step(rollback)
        .build()
}
