//! Audio device enumeration
//!
//! Lists output and input devices from ALL available audio hosts (ALSA,
//! PulseAudio, CoreAudio, WASAPI, ...) so the operator can pick any of them.
//! Devices are identified by a [`DeviceId`] that remembers the host, and
//! offered to the operator in a stable order: defaults first, then by host,
//! then by name.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Host, HostId};

use super::config::DeviceId;
use super::error::{AudioError, AudioResult};

/// Which way audio flows through a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

impl Direction {
    fn label(&self) -> &'static str {
        match self {
            Direction::Output => "output",
            Direction::Input => "input",
        }
    }
}

/// Get a human-readable name for a host ID
fn host_name(host_id: HostId) -> String {
    let name = format!("{:?}", host_id);
    match name.as_str() {
        "Alsa" => "ALSA".to_string(),
        "Jack" => "JACK".to_string(),
        "Wasapi" => "WASAPI".to_string(),
        _ => name,
    }
}

/// Get a host by its name string
fn get_host_by_name(name: &str) -> Option<Host> {
    cpal::available_hosts()
        .into_iter()
        .find(|id| host_name(*id) == name)
        .and_then(|id| cpal::host_from_id(id).ok())
}

fn host_devices(host: &Host, direction: Direction) -> Option<Vec<cpal::Device>> {
    let devices: Vec<cpal::Device> = match direction {
        Direction::Output => host.output_devices().ok()?.collect(),
        Direction::Input => host.input_devices().ok()?.collect(),
    };
    Some(devices)
}

fn host_default(host: &Host, direction: Direction) -> Option<cpal::Device> {
    match direction {
        Direction::Output => host.default_output_device(),
        Direction::Input => host.default_input_device(),
    }
}

/// Information about an audio device
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Device identifier for configuration (includes host info)
    pub id: DeviceId,
    /// Host backend name (e.g., "ALSA")
    pub host: String,
    /// Whether this is the system default device for its host
    pub is_default: bool,
}

impl std::fmt::Display for AudioDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.host, self.id.name)
    }
}

/// Get all devices of one direction from ALL hosts
pub fn list_devices(direction: Direction) -> AudioResult<Vec<AudioDevice>> {
    let mut all_devices: Vec<AudioDevice> = Vec::new();

    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(h) => h,
            Err(e) => {
                log::debug!("Could not initialize host {:?}: {}", host_id, e);
                continue;
            }
        };

        let host_name_str = host_name(host_id);
        let default_name = host_default(&host, direction).and_then(|d| d.name().ok());

        let Some(devices) = host_devices(&host, direction) else {
            log::debug!("Could not enumerate {} devices for {:?}", direction.label(), host_id);
            continue;
        };

        for device in devices {
            let Ok(name) = device.name() else {
                continue;
            };
            all_devices.push(AudioDevice {
                is_default: default_name.as_ref() == Some(&name),
                id: DeviceId::with_host(&name, &host_name_str),
                host: host_name_str.clone(),
            });
        }
    }

    if all_devices.is_empty() {
        return Err(AudioError::NoDevices(direction.label()));
    }

    all_devices.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| a.host.cmp(&b.host))
            .then_with(|| a.id.name.cmp(&b.id.name))
    });

    log::info!(
        "Enumerated {} {} devices from {} hosts",
        all_devices.len(),
        direction.label(),
        cpal::available_hosts().len()
    );

    Ok(all_devices)
}

/// Devices of one direction, or an empty list when none can be enumerated
pub fn available_devices(direction: Direction) -> Vec<AudioDevice> {
    match list_devices(direction) {
        Ok(devices) => devices,
        Err(e) => {
            log::warn!("Failed to enumerate audio devices: {}", e);
            Vec::new()
        }
    }
}

/// Find a device by its ID
///
/// Uses the host specified in the DeviceId if available, otherwise
/// searches all available hosts.
pub fn find_device_by_id(id: &DeviceId, direction: Direction) -> AudioResult<cpal::Device> {
    let matches = |d: &cpal::Device| d.name().ok().as_ref() == Some(&id.name);

    if let Some(host) = id.host.as_deref().and_then(get_host_by_name) {
        return host_devices(&host, direction)
            .ok_or_else(|| AudioError::ConfigError(format!("cannot list {} devices", direction.label())))?
            .into_iter()
            .find(matches)
            .ok_or_else(|| AudioError::DeviceNotFound(id.name.clone()));
    }

    cpal::available_hosts()
        .into_iter()
        .filter_map(|host_id| cpal::host_from_id(host_id).ok())
        .filter_map(|host| host_devices(&host, direction))
        .flatten()
        .find(matches)
        .ok_or_else(|| AudioError::DeviceNotFound(id.name.clone()))
}

/// Get the default device from the default host
pub fn get_cpal_default_device(direction: Direction) -> AudioResult<cpal::Device> {
    host_default(&cpal::default_host(), direction).ok_or_else(|| {
        AudioError::NoDefaultDevice(format!("No default {} device", direction.label()))
    })
}

/// Resolve an optional configured device to a cpal device
pub fn open_device(id: Option<&DeviceId>, direction: Direction) -> AudioResult<cpal::Device> {
    match id {
        Some(id) => find_device_by_id(id, direction),
        None => get_cpal_default_device(direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_enumeration() {
        // Passes without hardware; prints what it finds when there is some
        for direction in [Direction::Output, Direction::Input] {
            match list_devices(direction) {
                Ok(devices) => {
                    for device in &devices {
                        println!("  - {} (default: {})", device, device.is_default);
                    }
                    assert!(!devices.is_empty());
                }
                Err(AudioError::NoDevices(_)) => {
                    println!("No {} devices available (expected in CI)", direction.label());
                }
                Err(e) => {
                    println!("Error enumerating devices: {}", e);
                }
            }
        }
    }

    #[test]
    fn test_missing_device_is_not_found() {
        let id = DeviceId::new("twindeck-test-device-that-does-not-exist");
        assert!(find_device_by_id(&id, Direction::Output).is_err());
    }
}
