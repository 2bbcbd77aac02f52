//! End-to-end builds against the journal substrate.

use edgestack_lib::build_graph;
use edgestack_lib::config::load_config;
use edgestack_lib::export::names;
use edgestack_lib::resource::ResourceKind;
use edgestack_lib::substrate::{ChangeKind, InMemorySubstrate, JournalSubstrate, RecordStatus, StackState};
use edgestack_lib::util::hash::Hashable;

use super::common::{HANDLER_V1, HANDLER_V2, Project};

fn deploy(project: &Project) -> (edgestack_lib::BuildResult, JournalSubstrate) {
  let config = load_config(&project.config_path()).unwrap();
  let mut substrate =
    JournalSubstrate::open(&project.state_dir(), &config.stack_name, &config.region, &config.account).unwrap();
  let result = build_graph(&config, &mut substrate).unwrap();
  (result, substrate)
}

#[test]
fn first_deploy_creates_every_resource() {
  let project = Project::new(HANDLER_V1);
  let (result, journal) = deploy(&project);

  assert_eq!(journal.count(ChangeKind::Created), 6);
  assert_eq!(journal.state().generation, 1);
  assert_eq!(journal.state().exports.len(), 5);
  assert_eq!(
    journal.state().exports[names::EDGE_FUNCTION_ARN_WITH_VERSION],
    result.version.qualified()
  );
  assert!(journal.path().is_file());
}

#[test]
fn redeploying_unchanged_content_changes_nothing() {
  let project = Project::new(HANDLER_V1);
  let (first, _) = deploy(&project);
  let (second, journal) = deploy(&project);

  assert_eq!(journal.count(ChangeKind::Unchanged), 6);
  assert_eq!(journal.count(ChangeKind::Created), 0);
  assert_eq!(journal.count(ChangeKind::Superseded), 0);
  assert_eq!(journal.state().generation, 2);
  assert_eq!(first.exports, second.exports);
  assert_eq!(first.compute_hash().unwrap(), second.compute_hash().unwrap());
}

#[test]
fn new_handler_content_supersedes_the_previous_version() {
  let project = Project::new(HANDLER_V1);
  let (v1, _) = deploy(&project);

  project.write("edge/rerouter.js", HANDLER_V2);
  let (v2, journal) = deploy(&project);

  assert_ne!(v1.version.tag(), v2.version.tag());
  assert_eq!(v1.certificate.id(), v2.certificate.id());
  assert_eq!(v1.role.id(), v2.role.id());
  assert_eq!(v1.bucket.id(), v2.bucket.id());
  assert_eq!(v1.function.id(), v2.function.id());

  let changes = journal.changes();
  let change_of = |kind: ResourceKind, name: &str| {
    changes
      .iter()
      .find(|c| c.kind == kind && c.logical_name == name)
      .map(|c| c.change)
  };
  assert_eq!(change_of(ResourceKind::Certificate, "RootCertificate"), Some(ChangeKind::Unchanged));
  assert_eq!(change_of(ResourceKind::Function, "edge-rerouter"), Some(ChangeKind::Updated));
  assert_eq!(
    change_of(ResourceKind::FunctionVersion, v2.version.tag().as_str()),
    Some(ChangeKind::Created)
  );
  assert_eq!(
    change_of(ResourceKind::FunctionVersion, v1.version.tag().as_str()),
    Some(ChangeKind::Superseded)
  );
  assert_eq!(change_of(ResourceKind::Distribution, "SiteDistribution"), Some(ChangeKind::Updated));

  let state = StackState::load(journal.path()).unwrap().unwrap();
  let old = state
    .resources
    .values()
    .find(|r| r.logical_name == v1.version.tag().as_str())
    .unwrap();
  assert_eq!(old.status, RecordStatus::Superseded);
  assert_eq!(state.active().count(), 6);
  assert_eq!(
    state.exports[names::EDGE_FUNCTION_ARN_WITH_VERSION],
    format!("{}:{}", v2.function.id(), v2.version.tag())
  );
}

#[test]
fn failed_build_leaves_state_untouched() {
  let project = Project::new(HANDLER_V1);
  let (_, journal) = deploy(&project);
  let before = std::fs::read_to_string(journal.path()).unwrap();

  std::fs::remove_file(project.root().join("edge/rerouter.js")).unwrap();
  let config = load_config(&project.config_path()).unwrap();
  let mut substrate =
    JournalSubstrate::open(&project.state_dir(), &config.stack_name, &config.region, &config.account).unwrap();
  assert!(build_graph(&config, &mut substrate).is_err());

  assert_eq!(std::fs::read_to_string(journal.path()).unwrap(), before);
}

#[test]
fn journal_and_memory_substrates_assign_the_same_identifiers() {
  let project = Project::new(HANDLER_V1);
  let (journaled, _) = deploy(&project);

  let config = load_config(&project.config_path()).unwrap();
  let mut memory = InMemorySubstrate::new(&config.region, &config.account);
  let synthesized = build_graph(&config, &mut memory).unwrap();

  assert_eq!(journaled.exports, synthesized.exports);
}
