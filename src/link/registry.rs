//! Discoverable devices and the current selection.
//!
//! The registry holds exactly one discovery snapshot at a time.  A refresh
//! replaces it wholesale; nothing is merged across scans.

use core::hash::{Hash, Hasher};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Label shown when a device advertises no name.
pub const UNKNOWN_DEVICE: &str = "Unknown Device";

/// A remote device as reported by discovery.
///
/// Identity is the `id` alone; two descriptors with the same id and
/// different names are the same device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    #[serde(default, rename = "name")]
    pub display_name: Option<String>,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, display_name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.map(str::to_owned),
        }
    }

    /// Display name, or a placeholder for anonymous devices.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => UNKNOWN_DEVICE,
        }
    }
}

impl PartialEq for DeviceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DeviceDescriptor {}

impl Hash for DeviceDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.label(), self.id)
    }
}

/// Latest discovery snapshot plus the device the operator picked.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceDescriptor>,
    selected: Option<DeviceDescriptor>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh snapshot, keeping transport order.  Duplicate ids
    /// collapse to their first occurrence.
    pub fn replace(&mut self, snapshot: Vec<DeviceDescriptor>) {
        let reported = snapshot.len();
        let mut devices: Vec<DeviceDescriptor> = Vec::with_capacity(reported);
        for device in snapshot {
            if !devices.contains(&device) {
                devices.push(device);
            }
        }
        if devices.len() != reported {
            debug!(
                "Registry: collapsed {} duplicate entries",
                reported - devices.len()
            );
        }
        self.devices = devices;

        if let Some(sel) = &self.selected {
            if !self.devices.contains(sel) {
                info!("Registry: selected device {} vanished from scan", sel.id);
                self.selected = None;
            }
        }
    }

    pub fn list(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    pub fn find(&self, id: &str) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Mark `id` as the connection target.
    pub fn select(&mut self, id: &str) -> Result<DeviceDescriptor, RegistryError> {
        let device = self
            .find(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.to_owned()))?;
        self.selected = Some(device.clone());
        Ok(device)
    }

    pub fn selected(&self) -> Option<&DeviceDescriptor> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
