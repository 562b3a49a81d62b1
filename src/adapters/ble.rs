//! BLE status adapter.
//!
//! Implements [`RadioPort`]: one GATT service with one characteristic the
//! paired app reads, writes commands to, and subscribes to for status
//! notifications.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via raw
//!   `esp_idf_svc::sys` calls.
//! - **all other targets**: simulation stubs for host-side tests, with
//!   `sim_peer_*` hooks standing in for a phone.
//!
//! ## GATT Service Layout
//!
//! | Attribute        | UUID                                   | Perms                      |
//! |------------------|----------------------------------------|----------------------------|
//! | Service          | `4fafc201-1fb5-459e-8fcc-c5c9c331914b` |                            |
//! | Status / command | `beb5483e-36e1-4688-b7f5-ea07361b26a8` | Read+Write+Notify+Indicate |
//! | CCCD             | `0x2902`                               | Read+Write                 |
//!
//! Both 128-bit UUIDs are a contract with the mobile app and must never
//! change.
//!
//! ## Callback bridge
//!
//! Bluedroid callbacks are C function pointers that cannot capture Rust
//! state. They record handles in atomics and forward connect, disconnect
//! and write events to [`LINK_EVENTS`](crate::events::LINK_EVENTS); the
//! main cycle picks them up from there. The disconnect callback does
//! **not** restart advertising itself; the main cycle does that exactly
//! once per disconnect edge.

use log::info;

use crate::app::ports::RadioPort;
use crate::error::CommsError;
use crate::status::MAX_STATUS_LEN;

#[cfg(not(target_os = "espidf"))]
use crate::events::{EventQueue, LinkEvent};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

pub const SERVICE_UUID: u128 = 0x4fafc201_1fb5_459e_8fcc_c5c9c331914b;
pub const CHAR_STATUS: u128 = 0xbeb5483e_36e1_4688_b7f5_ea07361b26a8;

/// Characteristic value capacity; the longest status token.
const MAX_VALUE_LEN: usize = MAX_STATUS_LEN;

/// Value a READ returns before the first report.
const INITIAL_VALUE: &str = "S";

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    /// Stack not started, or advertising stopped (e.g. by a connection).
    Idle,
    Advertising,
    Connected,
    /// Stack bring-up failed; the radio is unusable until reset.
    Failed,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF BLE static state (callback bridge)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering as AtomicOrdering};

#[cfg(target_os = "espidf")]
static BLE_GATTS_IF: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONN_ID: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CONNECTED: AtomicBool = AtomicBool::new(false);
#[cfg(target_os = "espidf")]
static BLE_SVC_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_STATUS_CHAR_HANDLE: AtomicU32 = AtomicU32::new(0);
#[cfg(target_os = "espidf")]
static BLE_CCCD_HANDLE: AtomicU32 = AtomicU32::new(0);
/// Advertising data has been accepted by the controller.
#[cfg(target_os = "espidf")]
static BLE_ADV_DATA_READY: AtomicBool = AtomicBool::new(false);
/// The main cycle asked for advertising before the data was ready.
#[cfg(target_os = "espidf")]
static BLE_ADV_WANTED: AtomicBool = AtomicBool::new(false);

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

/// SAFETY: Bluedroid must be enabled. Called from the main task or the
/// GAP callback; the stack serialises the request internally.
#[cfg(target_os = "espidf")]
unsafe fn start_adv_raw() -> i32 {
    use esp_idf_svc::sys::*;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    unsafe { esp_ble_gap_start_advertising(&mut adv_params) }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => {
            BLE_ADV_DATA_READY.store(true, AtomicOrdering::Release);
            log::info!("BLE GAP: advertising data set");
            if BLE_ADV_WANTED.swap(false, AtomicOrdering::AcqRel) {
                unsafe { start_adv_raw() };
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            let status = unsafe { (*param).adv_start_cmpl.status };
            if status == esp_bt_status_t_ESP_BT_STATUS_SUCCESS {
                log::info!("BLE GAP: advertising started");
            } else {
                log::warn!("BLE GAP: advertising start failed (status={})", status);
            }
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use crate::events::{LINK_EVENTS, LinkEvent};
    use esp_idf_svc::sys::*;

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            BLE_GATTS_IF.store(gatts_if as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            let mut svc_id = esp_gatt_srvc_id_t {
                id: esp_gatt_id_t {
                    uuid: uuid128_to_esp(SERVICE_UUID),
                    inst_id: 0,
                },
                is_primary: true,
            };
            // Service declaration + characteristic declaration/value + CCCD.
            unsafe { esp_ble_gatts_create_service(gatts_if, &mut svc_id, 4) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let svc_handle = unsafe { (*param).create.service_handle };
            BLE_SVC_HANDLE.store(svc_handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: service created (handle={})", svc_handle);

            let mut char_uuid = uuid128_to_esp(CHAR_STATUS);
            let mut initial = [0u8; MAX_VALUE_LEN];
            initial[..INITIAL_VALUE.len()].copy_from_slice(INITIAL_VALUE.as_bytes());
            let mut value = esp_attr_value_t {
                attr_max_len: MAX_VALUE_LEN as u16,
                attr_len: INITIAL_VALUE.len() as u16,
                attr_value: initial.as_mut_ptr(),
            };
            let mut control = esp_attr_control_t {
                auto_rsp: ESP_GATT_AUTO_RSP as u8,
            };
            unsafe {
                esp_ble_gatts_add_char(
                    svc_handle,
                    &mut char_uuid,
                    (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                    (ESP_GATT_CHAR_PROP_BIT_READ
                        | ESP_GATT_CHAR_PROP_BIT_WRITE
                        | ESP_GATT_CHAR_PROP_BIT_NOTIFY
                        | ESP_GATT_CHAR_PROP_BIT_INDICATE) as esp_gatt_char_prop_t,
                    &mut value,
                    &mut control,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let handle = unsafe { (*param).add_char.attr_handle };
            BLE_STATUS_CHAR_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
            log::info!("BLE GATTS: status char (handle={})", handle);

            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            let mut cccd_uuid = uuid16_to_esp(ESP_GATT_UUID_CHAR_CLIENT_CONFIG as u16);
            let mut cccd_init = [0u8; 2];
            let mut value = esp_attr_value_t {
                attr_max_len: 2,
                attr_len: 2,
                attr_value: cccd_init.as_mut_ptr(),
            };
            let mut control = esp_attr_control_t {
                auto_rsp: ESP_GATT_AUTO_RSP as u8,
            };
            unsafe {
                esp_ble_gatts_add_char_descr(
                    svc_handle,
                    &mut cccd_uuid,
                    (ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE) as esp_gatt_perm_t,
                    &mut value,
                    &mut control,
                );
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let handle = unsafe { (*param).add_char_descr.attr_handle };
            BLE_CCCD_HANDLE.store(handle as u32, AtomicOrdering::Relaxed);
            let svc_handle = BLE_SVC_HANDLE.load(AtomicOrdering::Relaxed) as u16;
            unsafe { esp_ble_gatts_start_service(svc_handle) };
            log::info!("BLE GATTS: CCCD (handle={}), service started", handle);
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let conn_id = unsafe { (*param).connect.conn_id };
            BLE_CONN_ID.store(conn_id as u32, AtomicOrdering::Relaxed);
            BLE_CONNECTED.store(true, AtomicOrdering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", conn_id);
            LINK_EVENTS.push(LinkEvent::PeerConnected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            let reason = unsafe { (*param).disconnect.reason };
            BLE_CONNECTED.store(false, AtomicOrdering::Release);
            log::info!("BLE GATTS: client disconnected (reason=0x{:x})", reason);
            LINK_EVENTS.push(LinkEvent::PeerDisconnected);
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            // Long (prepared) writes are not part of the protocol.
            if p.is_prep {
                return;
            }
            if p.handle as u32 == BLE_STATUS_CHAR_HANDLE.load(AtomicOrdering::Relaxed) {
                let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
                LINK_EVENTS.push(LinkEvent::command(data));
            } else if p.handle as u32 == BLE_CCCD_HANDLE.load(AtomicOrdering::Relaxed) {
                log::info!("BLE GATTS: peer updated notification subscription");
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleAdapter {
    state: BleState,
    device_name: heapless::String<24>,
    /// Last value written to the characteristic.
    value: heapless::String<MAX_VALUE_LEN>,
    adv_starts: u32,
    notifications: u32,
    /// Simulation: whether a fake peer is connected.
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

impl BleAdapter {
    pub fn new(device_name: heapless::String<24>) -> Self {
        let mut value = heapless::String::new();
        value.push_str(INITIAL_VALUE).ok();
        Self {
            state: BleState::Idle,
            device_name,
            value,
            adv_starts: 0,
            notifications: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_connected: false,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    /// What a peer READ returns right now.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Advertising starts requested since boot (initial + restarts).
    pub fn adv_starts(&self) -> u32 {
        self.adv_starts
    }

    /// Notifications handed to the stack since boot.
    pub fn notifications(&self) -> u32 {
        self.notifications
    }

    /// Bring up the controller and Bluedroid, register the GATT app and
    /// configure the advertising payload. Advertising itself starts via
    /// [`RadioPort::start_advertising`].
    pub fn start(&mut self) -> Result<(), CommsError> {
        info!("BLE: starting stack as '{}'", self.device_name);
        match self.platform_start() {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            BLE_CONNECTED.load(AtomicOrdering::Acquire)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_connected
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;
        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            let ret = esp_bt_controller_init(&mut bt_cfg);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_init failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE);
            if ret != ESP_OK as i32 {
                log::error!("BLE: bt_controller_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bluedroid_init();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_init failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            let ret = esp_bluedroid_enable();
            if ret != ESP_OK as i32 {
                log::error!("BLE: bluedroid_enable failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }

            esp_ble_gap_register_callback(Some(ble_gap_event_handler));
            esp_ble_gatts_register_callback(Some(ble_gatts_event_handler));
            esp_ble_gatts_app_register(0);

            // Device name must be NUL-terminated for the C API.
            let mut name: heapless::Vec<u8, 25> = heapless::Vec::new();
            let _ = name.extend_from_slice(self.device_name.as_bytes());
            let _ = name.push(0);
            esp_ble_gap_set_device_name(name.as_ptr() as *const _);

            // Service UUID + name, no scan response, no connection
            // interval preference. Bluedroid shortens the name if the
            // packet overflows.
            let mut service_uuid = SERVICE_UUID.to_le_bytes();
            let mut adv_data = esp_ble_adv_data_t {
                set_scan_rsp: false,
                include_name: true,
                include_txpower: false,
                min_interval: 0x0000,
                max_interval: 0x0000,
                appearance: 0,
                manufacturer_len: 0,
                p_manufacturer_data: core::ptr::null_mut(),
                service_data_len: 0,
                p_service_data: core::ptr::null_mut(),
                service_uuid_len: service_uuid.len() as u16,
                p_service_uuid: service_uuid.as_mut_ptr(),
                flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
            };
            let ret = esp_ble_gap_config_adv_data(&mut adv_data);
            if ret != ESP_OK as i32 {
                log::error!("BLE: config_adv_data failed ({})", ret);
                return Err(CommsError::BleInitFailed);
            }
        }
        info!(
            "BLE(espidf): Bluedroid up, service {:032x} registering",
            SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        info!(
            "BLE(sim): stack up as '{}' (service {:032x})",
            self.device_name, SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_advertising(&mut self) -> Result<(), CommsError> {
        if !BLE_ADV_DATA_READY.load(AtomicOrdering::Acquire) {
            // The GAP callback starts advertising once the data is set.
            BLE_ADV_WANTED.store(true, AtomicOrdering::Release);
            return Ok(());
        }
        let ret = unsafe { start_adv_raw() };
        if ret != esp_idf_svc::sys::ESP_OK as i32 {
            log::warn!("BLE: start_advertising failed ({})", ret);
            return Err(CommsError::AdvertisingFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_advertising(&mut self) -> Result<(), CommsError> {
        info!("BLE(sim): advertising '{}'", self.device_name);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_notify(&mut self, payload: &str) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;
        let handle = BLE_STATUS_CHAR_HANDLE.load(AtomicOrdering::Relaxed) as u16;
        if handle == 0 {
            return Err(CommsError::NotifyFailed);
        }
        let len = payload.len() as u16;
        // Keep READs in step with what was last pushed.
        let ret = unsafe { esp_ble_gatts_set_attr_value(handle, len, payload.as_ptr()) };
        if ret != ESP_OK as i32 {
            log::warn!("BLE: set_attr_value failed ({})", ret);
        }
        if !BLE_CONNECTED.load(AtomicOrdering::Acquire) {
            return Err(CommsError::NotConnected);
        }
        let ret = unsafe {
            esp_ble_gatts_send_indicate(
                BLE_GATTS_IF.load(AtomicOrdering::Relaxed) as esp_gatt_if_t,
                BLE_CONN_ID.load(AtomicOrdering::Relaxed) as u16,
                handle,
                len,
                payload.as_ptr() as *mut u8,
                false,
            )
        };
        if ret != ESP_OK as i32 {
            return Err(CommsError::NotifyFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_notify(&mut self, payload: &str) -> Result<(), CommsError> {
        if !self.sim_connected {
            return Err(CommsError::NotConnected);
        }
        log::debug!("BLE(sim): notify '{}'", payload);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation hooks (host only)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl BleAdapter {
    /// A phone connects. Like the real stack, this stops advertising.
    pub fn sim_peer_connect(&mut self, events: &EventQueue) {
        self.sim_connected = true;
        self.state = BleState::Connected;
        events.push(LinkEvent::PeerConnected);
    }

    /// The phone goes away. Advertising stays off until restarted.
    pub fn sim_peer_disconnect(&mut self, events: &EventQueue) {
        self.sim_connected = false;
        self.state = BleState::Idle;
        events.push(LinkEvent::PeerDisconnected);
    }

    /// The phone writes to the characteristic.
    pub fn sim_peer_write(&mut self, events: &EventQueue, bytes: &[u8]) {
        events.push(LinkEvent::command(bytes));
    }
}

// ───────────────────────────────────────────────────────────────
// RadioPort implementation
// ───────────────────────────────────────────────────────────────

impl RadioPort for BleAdapter {
    fn start_advertising(&mut self) -> Result<(), CommsError> {
        if self.state == BleState::Failed {
            return Err(CommsError::BleInitFailed);
        }
        self.platform_start_advertising()?;
        self.adv_starts += 1;
        self.state = BleState::Advertising;
        Ok(())
    }

    fn notify(&mut self, payload: &str) -> Result<(), CommsError> {
        if payload.len() > MAX_VALUE_LEN {
            return Err(CommsError::PayloadTooLong);
        }
        self.value.clear();
        // Length checked above.
        let _ = self.value.push_str(payload);
        self.platform_notify(payload)?;
        self.notifications += 1;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
