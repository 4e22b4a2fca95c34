//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` when the migrations change.

diesel::table! {
    /// Student records, one per signed-in principal.
    students (uid) {
        /// Identity provider subject id.
        uid -> Text,
        nombre -> Text,
        correo -> Text,
        /// Always `estudiante`.
        rol -> Text,
        /// Upper-cased group; empty until assigned.
        grupo -> Text,
        carrera -> Text,
        foto_perfil -> Nullable<Text>,
        created_at -> Timestamptz,
        last_login -> Timestamptz,
    }
}

diesel::table! {
    /// Debts raised against students.
    adeudos (id) {
        id -> Text,
        student_uid -> Text,
        prestamo_id -> Nullable<Text>,
        concepto -> Text,
        monto -> Float8,
        /// `pendiente` or `pagado`.
        estado -> Text,
        fecha_inicio -> Timestamptz,
        fecha_pago -> Nullable<Timestamptz>,
        /// JSON array of `{nombre, cantidad}`.
        materiales -> Jsonb,
    }
}

diesel::table! {
    /// Material loans.
    prestamos (id) {
        id -> Text,
        student_uid -> Text,
        materiales -> Jsonb,
        /// `activo` or `completado`.
        estado -> Text,
        fecha_inicio -> Timestamptz,
        fecha_devolucion -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Return receipts for completed loans.
    completados (id) {
        id -> Text,
        student_uid -> Text,
        prestamo_id -> Nullable<Text>,
        materiales -> Jsonb,
        fecha_inicio -> Timestamptz,
        fecha_devolucion -> Timestamptz,
    }
}

diesel::table! {
    /// Lab request forms.
    formularios (id) {
        id -> Text,
        student_uid -> Text,
        materia -> Text,
        profesor -> Text,
        grupo -> Text,
        practica -> Text,
        materiales -> Jsonb,
        fecha_solicitud -> Timestamptz,
    }
}

diesel::joinable!(adeudos -> students (student_uid));
diesel::joinable!(prestamos -> students (student_uid));
diesel::joinable!(completados -> students (student_uid));
diesel::joinable!(formularios -> students (student_uid));

diesel::allow_tables_to_appear_in_same_query!(
    students,
    adeudos,
    prestamos,
    completados,
    formularios,
);
