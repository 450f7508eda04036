//! End-to-end lifecycle scenarios wired over the in-memory adapters.

// Linked into this test target but only used by the library itself.
use async_trait as _;
use chrono as _;
use tracing as _;

use std::collections::BTreeSet;
use std::sync::Arc;

use opportune_application::{
    ApplicationService, ApprovalAction, AuthorizationService, ProfileCompletionHandler,
    ProfileRepository, TaskService, TransitionInput,
};
use opportune_core::{AppError, OrganizationId, UserId};
use opportune_domain::{
    ApplicationStatus, Principal, Reward, RewardKind, Role, Skill, TaskDraft, TaskStatus,
    TaskVisibility,
};
use opportune_infrastructure::{
    InMemoryApplicationRepository, InMemoryDirectory, InMemoryProfileRepository,
    InMemoryTaskRepository, RecordingNotifier,
};

struct World {
    tasks: TaskService,
    applications: ApplicationService,
    profiles: Arc<InMemoryProfileRepository>,
    notifier: Arc<RecordingNotifier>,
    directory: Arc<InMemoryDirectory>,
}

fn world() -> World {
    let task_store = Arc::new(InMemoryTaskRepository::new());
    let application_store = Arc::new(InMemoryApplicationRepository::new());
    let profiles = Arc::new(InMemoryProfileRepository::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let authorization = AuthorizationService::new();

    let tasks = TaskService::new(
        authorization,
        task_store.clone(),
        directory.clone(),
        notifier.clone(),
    );
    let applications = ApplicationService::new(
        authorization,
        task_store,
        application_store,
        notifier.clone(),
        Arc::new(ProfileCompletionHandler::new(profiles.clone())),
    );

    World {
        tasks,
        applications,
        profiles,
        notifier,
        directory,
    }
}

fn principal(roles: BTreeSet<Role>, organization: Option<OrganizationId>) -> Principal {
    Principal::new(UserId::new(), "Member", roles, organization)
}

async fn register(world: &World, principal: &Principal) {
    let registered = world.directory.register(principal.clone()).await;
    assert!(registered.is_ok());
}

fn skill_list(names: &[&str]) -> Vec<Skill> {
    names
        .iter()
        .filter_map(|name| Skill::new(*name).ok())
        .collect()
}

fn draft(organization: Option<OrganizationId>, required_skills: Vec<Skill>) -> TaskDraft {
    TaskDraft {
        title: "Restore the archive".to_owned(),
        description: "Scan, label and index the collection".to_owned(),
        organization,
        visibility: TaskVisibility::Global,
        required_skills,
        reward: Reward::new(RewardKind::Credit, "40").unwrap_or_else(|_| unreachable!()),
    }
}

#[tokio::test]
async fn full_funnel_accrues_skills_and_experience() {
    let world = world();
    let organization = OrganizationId::new();
    let owner = principal(BTreeSet::from([Role::TaskManager]), Some(organization));
    let applicant = principal(BTreeSet::from([Role::Applicant]), None);
    register(&world, &owner).await;
    register(&world, &applicant).await;

    // Pre-seed an overlapping skill so the merge has something to dedupe.
    let seeded = world
        .profiles
        .merge_skills(applicant.id(), &skill_list(&["scanning"]))
        .await;
    assert_eq!(seeded.ok(), Some(1));

    let Ok(task) = world
        .tasks
        .create(&owner, draft(Some(organization), skill_list(&["scanning", "indexing"])))
        .await
    else {
        panic!("create succeeds");
    };
    assert_eq!(task.status(), TaskStatus::Published);

    let Ok(application) = world.applications.apply(&applicant, task.id()).await else {
        panic!("apply succeeds");
    };
    assert_eq!(application.status(), ApplicationStatus::Submitted);

    for (actor, target) in [
        (&owner, ApplicationStatus::Shortlisted),
        (&owner, ApplicationStatus::Offered),
        (&applicant, ApplicationStatus::Accepted),
        (&applicant, ApplicationStatus::CompletionRequested),
        (&owner, ApplicationStatus::Completed),
    ] {
        let moved = world
            .applications
            .transition(actor, application.id(), target, TransitionInput::default())
            .await;
        assert!(moved.is_ok(), "transition to {} succeeds", target.as_str());
    }

    let Ok(Some(profile)) = world.profiles.find_profile(applicant.id()).await else {
        panic!("profile exists after completion");
    };

    let names: Vec<&str> = profile.skills().iter().map(Skill::name).collect();
    assert_eq!(names, vec!["scanning", "indexing"]);
    assert_eq!(profile.experience().len(), 1);
    assert_eq!(profile.experience()[0].task, task.id());
    assert_eq!(profile.experience()[0].reward.kind(), RewardKind::Credit);

    // The applicant heard about the offer, the verdicts; the owner heard
    // about the submission and the funnel answers.
    let deliveries = world.notifier.deliveries().await;
    assert!(deliveries
        .iter()
        .any(|(recipient, notification)| *recipient == applicant.id()
            && notification.title == "Completion accepted"));
}

#[tokio::test]
async fn completed_application_cannot_be_reopened_for_a_second_accrual() {
    let world = world();
    let owner = principal(BTreeSet::from([Role::TaskManager]), None);
    let admin = principal(BTreeSet::from([Role::GlobalAdmin]), None);
    let applicant = principal(BTreeSet::from([Role::Applicant]), None);
    register(&world, &owner).await;
    register(&world, &admin).await;
    register(&world, &applicant).await;

    let Ok(task) = world
        .tasks
        .create(&owner, draft(None, skill_list(&["painting"])))
        .await
    else {
        panic!("create succeeds");
    };
    let Ok(application) = world.applications.apply(&applicant, task.id()).await else {
        panic!("apply succeeds");
    };

    for (actor, target) in [
        (&owner, ApplicationStatus::Shortlisted),
        (&owner, ApplicationStatus::Offered),
        (&applicant, ApplicationStatus::Accepted),
        (&applicant, ApplicationStatus::CompletionRequested),
        (&owner, ApplicationStatus::Completed),
    ] {
        let moved = world
            .applications
            .transition(actor, application.id(), target, TransitionInput::default())
            .await;
        assert!(moved.is_ok());
    }

    let reopened = world
        .applications
        .transition(
            &admin,
            application.id(),
            ApplicationStatus::Offered,
            TransitionInput::default(),
        )
        .await;
    assert!(matches!(reopened, Err(AppError::InvalidTransition(_))));

    let Ok(Some(profile)) = world.profiles.find_profile(applicant.id()).await else {
        panic!("profile exists after completion");
    };
    assert_eq!(profile.experience().len(), 1);
}

#[tokio::test]
async fn rejected_completion_is_terminal_and_leaves_the_profile_unchanged() {
    let world = world();
    let owner = principal(BTreeSet::from([Role::TaskManager]), None);
    let applicant = principal(BTreeSet::from([Role::Applicant]), None);
    register(&world, &owner).await;
    register(&world, &applicant).await;

    let Ok(task) = world
        .tasks
        .create(&owner, draft(None, skill_list(&["carpentry"])))
        .await
    else {
        panic!("create succeeds");
    };

    let Ok(application) = world.applications.apply(&applicant, task.id()).await else {
        panic!("apply succeeds");
    };

    for (actor, target) in [
        (&owner, ApplicationStatus::Shortlisted),
        (&owner, ApplicationStatus::Offered),
        (&applicant, ApplicationStatus::Accepted),
        (&applicant, ApplicationStatus::CompletionRequested),
    ] {
        let moved = world
            .applications
            .transition(actor, application.id(), target, TransitionInput::default())
            .await;
        assert!(moved.is_ok());
    }

    let rejected = world
        .applications
        .transition(
            &owner,
            application.id(),
            ApplicationStatus::CompletionRejected,
            TransitionInput {
                reason: Some("incomplete".to_owned()),
            },
        )
        .await;
    assert!(rejected.is_ok_and(|application| {
        application.status() == ApplicationStatus::CompletionRejected
            && application.rejection_reason() == Some("incomplete")
    }));

    let late_accept = world
        .applications
        .transition(
            &owner,
            application.id(),
            ApplicationStatus::Completed,
            TransitionInput::default(),
        )
        .await;
    assert!(matches!(late_accept, Err(AppError::InvalidTransition(_))));

    let profile = world.profiles.find_profile(applicant.id()).await;
    assert!(profile.is_ok_and(|profile| profile.is_none()));
}

#[tokio::test]
async fn pending_publication_broadcasts_once_to_the_right_audience() {
    let world = world();
    let organization = OrganizationId::new();
    let advertiser = principal(BTreeSet::from([Role::TaskAdvertiser]), Some(organization));
    let school_admin = principal(BTreeSet::from([Role::SchoolAdmin]), Some(organization));
    let bystander = principal(BTreeSet::from([Role::Applicant]), None);
    register(&world, &advertiser).await;
    register(&world, &school_admin).await;
    register(&world, &bystander).await;

    let Ok(task) = world
        .tasks
        .create(&advertiser, draft(Some(organization), vec![]))
        .await
    else {
        panic!("create succeeds");
    };
    assert_eq!(task.status(), TaskStatus::Pending);
    assert!(world.notifier.deliveries().await.is_empty());

    let approved = world
        .tasks
        .approve(&school_admin, task.id(), ApprovalAction::Approve)
        .await;
    assert!(approved.is_ok());

    let deliveries = world.notifier.deliveries().await;
    let recipients: Vec<UserId> = deliveries.iter().map(|(recipient, _)| *recipient).collect();
    assert!(recipients.contains(&bystander.id()));
    assert!(recipients.contains(&school_admin.id()));
    assert!(!recipients.contains(&advertiser.id()));

    // Re-approving an already-published task stays silent.
    let again = world
        .tasks
        .approve(&school_admin, task.id(), ApprovalAction::Approve)
        .await;
    assert!(again.is_ok());
    assert_eq!(world.notifier.deliveries().await.len(), deliveries.len());
}

#[tokio::test]
async fn application_listing_stays_inside_the_caller_scope() {
    let world = world();
    let organization = OrganizationId::new();
    let owner = principal(BTreeSet::from([Role::TaskManager]), Some(organization));
    let foreign_owner = principal(BTreeSet::from([Role::TaskManager]), Some(OrganizationId::new()));
    let applicant = principal(BTreeSet::from([Role::Applicant]), None);
    register(&world, &owner).await;
    register(&world, &foreign_owner).await;
    register(&world, &applicant).await;

    let Ok(org_task) = world
        .tasks
        .create(&owner, draft(Some(organization), vec![]))
        .await
    else {
        panic!("create succeeds");
    };
    let Ok(foreign_task) = world
        .tasks
        .create(&foreign_owner, draft(foreign_owner.organization(), vec![]))
        .await
    else {
        panic!("create succeeds");
    };

    let applied = world.applications.apply(&applicant, org_task.id()).await;
    assert!(applied.is_ok());
    let applied = world.applications.apply(&applicant, foreign_task.id()).await;
    assert!(applied.is_ok());

    // The owner's full access reaches only the organization's tasks.
    let owner_view = world.applications.list_applications(&owner, None).await;
    assert!(owner_view.is_ok_and(|applications| {
        applications.len() == 1 && applications[0].task() == org_task.id()
    }));

    // The applicant's own-only access sees both own applications.
    let applicant_view = world.applications.list_applications(&applicant, None).await;
    assert!(applicant_view.is_ok_and(|applications| applications.len() == 2));

    // A foreign task id with full access is denied outright.
    let denied = world
        .applications
        .list_applications(&owner, Some(foreign_task.id()))
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}
