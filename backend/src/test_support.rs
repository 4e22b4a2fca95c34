//! Test utilities for the portal crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    CompletedLoanRecord, DebtRecord, DebtStatus, FormRecord, IdentityClaims, LoanRecord,
    LoanStatus, Material, SessionRole, SessionToken,
};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used across fixtures.
pub fn fixture_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).single() {
        Some(now) => now,
        None => panic!("fixture timestamp must be valid"),
    }
}

/// A day offset from [`fixture_now`].
pub fn fixture_day(offset: i64) -> DateTime<Utc> {
    fixture_now() + TimeDelta::days(offset)
}

/// Session for `uid` signed in as `{uid}@lasalle.mx`.
pub fn student_token(uid: &str) -> SessionToken {
    token(uid, &format!("{uid}@lasalle.mx"), SessionRole::Student)
}

/// Admin session for `uid` signed in as `{uid}@lasalle.mx`.
pub fn admin_token(uid: &str) -> SessionToken {
    token(uid, &format!("{uid}@lasalle.mx"), SessionRole::Admin)
}

/// Session with an explicit email and role, valid for two hours.
pub fn token(uid: &str, email: &str, role: SessionRole) -> SessionToken {
    let claims = IdentityClaims {
        subject: uid.to_owned(),
        email: Some(email.to_owned()),
        name: Some(uid.to_owned()),
        picture: None,
    };
    SessionToken::issue(claims, role, fixture_now(), chrono::Duration::hours(2))
}

fn materials() -> Vec<Material> {
    vec![Material {
        nombre: "Batidora".to_owned(),
        cantidad: 1,
    }]
}

/// Debt owned by `uid`.
pub fn debt(id: &str, uid: &str, estado: DebtStatus) -> DebtRecord {
    DebtRecord {
        id: id.to_owned(),
        student_uid: uid.to_owned(),
        prestamo_id: None,
        concepto: "Material dañado".to_owned(),
        monto: 150.0,
        estado,
        fecha_inicio: fixture_day(-10),
        fecha_pago: (estado == DebtStatus::Pagado).then(|| fixture_day(-2)),
        materiales: materials(),
    }
}

/// Active loan owned by `uid`.
pub fn loan(id: &str, uid: &str) -> LoanRecord {
    LoanRecord {
        id: id.to_owned(),
        student_uid: uid.to_owned(),
        materiales: materials(),
        estado: LoanStatus::Activo,
        fecha_inicio: fixture_day(-1),
        fecha_devolucion: None,
    }
}

/// Completed loan owned by `uid`, returned `returned_days_ago` days ago.
pub fn completed(id: &str, uid: &str, returned_days_ago: i64) -> CompletedLoanRecord {
    CompletedLoanRecord {
        id: id.to_owned(),
        student_uid: uid.to_owned(),
        prestamo_id: Some(format!("p-{id}")),
        materiales: materials(),
        fecha_inicio: fixture_day(-returned_days_ago - 1),
        fecha_devolucion: fixture_day(-returned_days_ago),
    }
}

/// Practical form filed by `uid`.
pub fn form(id: &str, uid: &str) -> FormRecord {
    FormRecord {
        id: id.to_owned(),
        student_uid: uid.to_owned(),
        materia: "Cocina mexicana".to_owned(),
        profesor: "Chef Rivera".to_owned(),
        grupo: "MORNING".to_owned(),
        practica: "Mole poblano".to_owned(),
        materiales: materials(),
        fecha_solicitud: fixture_day(-3),
    }
}
