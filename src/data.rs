pub mod device;
pub mod guest;
pub mod host;
pub mod inventory;
pub mod units;

use anyhow::Result;
use guest::GuestFacts;
use host::HostFacts;
use inventory::Inventory;
use log::debug;

/// Normalize the facts needed to evaluate one named guest: the guest itself and
/// the host it runs on.
pub fn collect_facts(inventory: &Inventory, vm_name: &str) -> Result<(HostFacts, GuestFacts)> {
    let raw_vm = inventory.find_vm(vm_name)?;
    let raw_host = inventory.find_host(&raw_vm.host)?;

    let host = HostFacts::from_inventory(&inventory.about, raw_host, inventory);
    debug!("Host facts: {:#?}", host);
    let guest = GuestFacts::from_inventory(raw_vm, &host);
    debug!("Guest facts: {:#?}", guest);
    Ok((host, guest))
}
