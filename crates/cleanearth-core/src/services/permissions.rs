use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Internet,
    NetworkState,
    ReadStorage,
    WriteStorage,
}

pub const REQUIRED_PERMISSIONS: [Permission; 4] = [
    Permission::Internet,
    Permission::NetworkState,
    Permission::ReadStorage,
    Permission::WriteStorage,
];

pub trait PermissionProbe {
    fn is_granted(&self, permission: Permission) -> bool;

    fn request(&self, missing: &[Permission]) -> Vec<(Permission, bool)>;
}

// Desktop platforms grant everything at install time.
pub struct DesktopPermissions;

impl PermissionProbe for DesktopPermissions {
    fn is_granted(&self, _permission: Permission) -> bool {
        true
    }

    fn request(&self, missing: &[Permission]) -> Vec<(Permission, bool)> {
        missing.iter().map(|p| (*p, true)).collect()
    }
}

pub fn missing_permissions(probe: &dyn PermissionProbe) -> Vec<Permission> {
    REQUIRED_PERMISSIONS
        .iter()
        .copied()
        .filter(|p| !probe.is_granted(*p))
        .collect()
}

pub fn all_granted(results: &[(Permission, bool)]) -> bool {
    results.iter().all(|(_, granted)| *granted)
}
