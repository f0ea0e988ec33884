use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::database::models::{
    CancellationPolicy, Contract, LatenessPolicy, OrgStructureUnit, WorkObject,
};

/// In-memory arena over batch-loaded org units. Settings resolve by walking
/// parent pointers until a unit owns the value (its inherit flag is cleared);
/// the walk is depth-bounded and keeps a visited set so a corrupted tree can
/// never spin it.
pub struct OrgUnitTree {
    units: HashMap<Uuid, OrgStructureUnit>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

impl OrgUnitTree {
    pub fn new(units: Vec<OrgStructureUnit>) -> Self {
        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for unit in &units {
            if let Some(parent_id) = unit.parent_id {
                children.entry(parent_id).or_default().push(unit.id);
            }
        }
        let units = units.into_iter().map(|u| (u.id, u)).collect();
        Self { units, children }
    }

    pub fn get(&self, id: Uuid) -> Option<&OrgStructureUnit> {
        self.units.get(&id)
    }

    /// Walk `start` and its ancestors, returning the first value `pick`
    /// yields. Aborts (returning None) on a cycle or a dangling parent.
    fn walk_from<T>(
        &self,
        start: Option<Uuid>,
        pick: impl Fn(&OrgStructureUnit) -> Option<T>,
    ) -> Option<T> {
        let mut visited = HashSet::new();
        let mut current = start;

        while let Some(id) = current {
            if !visited.insert(id) || visited.len() > self.units.len() {
                log::warn!("Org unit chain revisited {}; aborting resolution", id);
                return None;
            }
            let unit = self.units.get(&id)?;
            if let Some(value) = pick(unit) {
                return Some(value);
            }
            current = unit.parent_id;
        }

        None
    }

    pub fn effective_schedule_for_unit(&self, unit_id: Uuid) -> Option<Uuid> {
        self.walk_from(Some(unit_id), |unit| unit.own_payment_schedule_id())
    }

    /// Object's own schedule wins; otherwise the first owning ancestor's.
    pub fn effective_payment_schedule(&self, object: &WorkObject) -> Option<Uuid> {
        object
            .payment_schedule_id
            .or_else(|| self.walk_from(object.org_unit_id, |unit| unit.own_payment_schedule_id()))
    }

    pub fn effective_payment_system(&self, object: &WorkObject) -> Option<Uuid> {
        object
            .payment_system_id
            .or_else(|| self.walk_from(object.org_unit_id, |unit| unit.own_payment_system_id()))
    }

    pub fn effective_lateness_policy(&self, object: &WorkObject) -> Option<LatenessPolicy> {
        self.walk_from(object.org_unit_id, |unit| unit.own_lateness_policy())
    }

    pub fn effective_cancellation_policy(&self, object: &WorkObject) -> Option<CancellationPolicy> {
        self.walk_from(object.org_unit_id, |unit| unit.own_cancellation_policy())
    }

    /// A contract with its own non-inherited schedule takes absolute
    /// priority; inheritance walking only happens when the contract defers.
    pub fn schedule_for_contract(&self, contract: &Contract, object: &WorkObject) -> Option<Uuid> {
        if !contract.inherit_payment_schedule {
            return contract.payment_schedule_id;
        }
        self.effective_payment_schedule(object)
    }

    /// All units below `root` (recursive descent), excluding `root` itself.
    pub fn descendants(&self, root: Uuid) -> HashSet<Uuid> {
        let mut found = HashSet::new();
        let mut queue = vec![root];

        while let Some(id) = queue.pop() {
            if let Some(child_ids) = self.children.get(&id) {
                for &child in child_ids {
                    if found.insert(child) {
                        queue.push(child);
                    }
                }
            }
        }

        found
    }

    /// Units whose effective schedule resolves to the given one, together
    /// with all of their descendants. Used by the batch trigger to collect
    /// eligible objects.
    pub fn units_resolving_to_schedule(&self, schedule_id: Uuid) -> HashSet<Uuid> {
        let mut eligible = HashSet::new();

        for &id in self.units.keys() {
            if self.effective_schedule_for_unit(id) == Some(schedule_id) {
                eligible.insert(id);
                eligible.extend(self.descendants(id));
            }
        }

        eligible
    }
}
