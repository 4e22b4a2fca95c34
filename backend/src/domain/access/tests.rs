//! Tests for the access policy decision function.

use super::*;
use crate::domain::IdentityClaims;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn policy() -> AccessPolicy {
    AccessPolicy::default()
}

fn token(email: Option<&str>, now: DateTime<Utc>) -> SessionToken {
    SessionToken::issue(
        IdentityClaims {
            subject: "u1".to_owned(),
            email: email.map(str::to_owned),
            name: Some("Ana".to_owned()),
            picture: None,
        },
        SessionRole::Student,
        now,
        Duration::hours(2),
    )
}

#[rstest]
#[case(Some("ana@lasalle.mx"), true)]
#[case(Some("ana.perez@lasalle.mx"), true)]
#[case(Some("user@notlasalle.mx.evil.com"), false)]
#[case(Some("user@lasalle.mx.evil.com"), false)]
#[case(Some("user@LASALLE.MX"), false)]
#[case(Some("user@evil-lasalle.mx"), false)]
#[case(Some("@lasalle.mx"), false)]
#[case(Some(""), false)]
#[case(None, false)]
fn protected_paths_follow_the_suffix_rule(
    policy: AccessPolicy,
    now: DateTime<Utc>,
    #[case] email: Option<&str>,
    #[case] allowed: bool,
) {
    let token = token(email, now);
    let decision = policy.decide("/alumno/perfil", Some(&token), now);
    let expected = if allowed {
        GateDecision::Allow
    } else {
        GateDecision::Redirect("/".to_owned())
    };
    assert_eq!(decision, expected);
    assert_eq!(policy.is_authorized(Some(&token), now), allowed);
}

#[rstest]
#[case("/alumno")]
#[case("/alumno/")]
#[case("/alumno/perfil")]
#[case("/admin/estudiantes")]
#[case("/api/adeudos/a-1")]
fn absent_token_is_redirected(policy: AccessPolicy, now: DateTime<Utc>, #[case] path: &str) {
    assert_eq!(
        policy.decide(path, None, now),
        GateDecision::Redirect("/".to_owned())
    );
}

#[rstest]
#[case("/")]
#[case("/alumnos")]
#[case("/administracion")]
#[case("/health/ready")]
#[case("/api/auth/signin")]
#[case("/api/auth/callback")]
fn unprotected_paths_always_pass(policy: AccessPolicy, now: DateTime<Utc>, #[case] path: &str) {
    assert_eq!(policy.decide(path, None, now), GateDecision::Allow);
}

#[rstest]
fn expired_token_is_redirected(policy: AccessPolicy, now: DateTime<Utc>) {
    let token = token(Some("ana@lasalle.mx"), now);
    let later = now + Duration::hours(3);
    assert_eq!(
        policy.decide("/alumno", Some(&token), later),
        GateDecision::Redirect("/".to_owned())
    );
}

#[rstest]
fn gate_and_callback_agree_for_every_case(policy: AccessPolicy, now: DateTime<Utc>) {
    let emails = [
        Some("ana@lasalle.mx"),
        Some("ana@gmail.com"),
        Some("x@lasalle.mx.evil.com"),
        None,
    ];
    for email in emails {
        let token = token(email, now);
        let gate_allows = policy.decide("/api/upsert", Some(&token), now) == GateDecision::Allow;
        assert_eq!(gate_allows, policy.is_authorized(Some(&token), now));
    }
}

#[rstest]
#[case("lasalle.mx")]
#[case("@")]
#[case(" @lasalle.mx")]
#[case("@a@b")]
fn invalid_suffixes_are_rejected(#[case] raw: &str) {
    assert!(matches!(
        EmailSuffix::new(raw),
        Err(AccessPolicyError::InvalidSuffix(_))
    ));
}

#[rstest]
#[case("alumno")]
#[case("/alumno/")]
fn invalid_prefixes_are_rejected(#[case] prefix: &str) {
    let result = AccessPolicy::new(EmailSuffix::default(), [prefix], Vec::<String>::new());
    assert!(matches!(result, Err(AccessPolicyError::InvalidPrefix(_))));
}

#[rstest]
fn custom_suffix_is_honoured(now: DateTime<Utc>) {
    let policy = AccessPolicy::new(
        EmailSuffix::new("@ulsa.edu.mx").expect("valid suffix"),
        ["/alumno"],
        Vec::<String>::new(),
    )
    .expect("valid policy");
    let lasalle = token(Some("ana@lasalle.mx"), now);
    let ulsa = token(Some("ana@ulsa.edu.mx"), now);
    assert!(!policy.is_authorized(Some(&lasalle), now));
    assert!(policy.is_authorized(Some(&ulsa), now));
}

#[rstest]
fn role_policy_grants_admin_by_exact_email() {
    let roles = RolePolicy::new([" jefa.lab@lasalle.mx ", ""]);
    assert_eq!(roles.role_for("jefa.lab@lasalle.mx"), SessionRole::Admin);
    assert_eq!(roles.role_for("JEFA.LAB@lasalle.mx"), SessionRole::Student);
    assert_eq!(roles.role_for("ana@lasalle.mx"), SessionRole::Student);
}
