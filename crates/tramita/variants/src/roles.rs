//! Production role ids.
//!
//! Role ids are opaque strings matched exactly against the
//! `allowed_roles` of each transition; the directory that assigns them
//! to people lives outside this crate. `SISTEMA` is reserved for the
//! deadline scanner.

use tramita_types::RoleId;

pub const ESCOLA: &str = "ESCOLA";
pub const DRE: &str = "DRE";
pub const CODAE: &str = "CODAE";
pub const TERCEIRIZADA: &str = "TERCEIRIZADA";
pub const DISTRIBUIDOR: &str = "DISTRIBUIDOR";
pub const DILOG: &str = "DILOG";
pub const NUTRICIONISTA: &str = "NUTRICIONISTA";
pub const SISTEMA: &str = tramita_types::SYSTEM_ROLE;

pub fn escola() -> RoleId {
    RoleId::new(ESCOLA)
}

pub fn dre() -> RoleId {
    RoleId::new(DRE)
}

pub fn codae() -> RoleId {
    RoleId::new(CODAE)
}

pub fn terceirizada() -> RoleId {
    RoleId::new(TERCEIRIZADA)
}

pub fn distribuidor() -> RoleId {
    RoleId::new(DISTRIBUIDOR)
}

pub fn dilog() -> RoleId {
    RoleId::new(DILOG)
}

pub fn nutricionista() -> RoleId {
    RoleId::new(NUTRICIONISTA)
}

pub fn sistema() -> RoleId {
    RoleId::system()
}
