// Inventory snapshot and material selection.
//
// The planner never moves items; it only asks "which stack would I use?"
// and reports the answer (or a `WrongItemSelection`) for an executor to act
// on. The question is phrased as a `StackSelection`: a data-driven filter
// chain plus a sort order, both plain enums so selections can be logged,
// compared, and carried inside results. `ContainerSelection` restricts which
// parts of the inventory may provide the stack (the break and interact
// simulators only swap silently from the hotbar).
//
// Slot numbering: 0..9 hotbar, 9..36 main inventory, 40 offhand.
//
// See also: `item.rs` for `ItemStack` and the breaking math the sort keys
// use, `sim/break_sim.rs` and `sim/interact_sim.rs` for the selections they
// build, `result/mod.rs` for `Resolution`, which turns a selection back into
// a slot swap.

use crate::agent::Agent;
use crate::item::{self, Item, ItemStack, OFFHAND_SLOT, ToolTier};
use crate::state::BlockState;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const HOTBAR_SIZE: u8 = 9;
pub const MAIN_END: u8 = 36;

// ---------------------------------------------------------------------------
// Stack selection
// ---------------------------------------------------------------------------

/// One predicate in a selection's filter chain. A stack must pass all of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StackFilter {
    Item(Item),
    NotItem(Item),
    /// Faster than bare hands against the state, if any tool is.
    EfficientFor(BlockState),
    /// Yields a drop, if the state needs a tool for that.
    SuitableFor(BlockState),
    SilkTouch,
    MinFortune(u8),
    ExcludeTier(ToolTier),
}

impl StackFilter {
    pub fn accepts(&self, stack: &ItemStack) -> bool {
        match self {
            StackFilter::Item(item) => stack.item == *item,
            StackFilter::NotItem(item) => stack.item != *item,
            StackFilter::EfficientFor(state) => {
                state.kind().mineable_with().is_none() || stack.item.mining_speed(state) > 1.0
            }
            StackFilter::SuitableFor(state) => {
                state.kind().required_tool_level().is_none() || stack.item.can_harvest(state)
            }
            StackFilter::SilkTouch => stack.silk_touch,
            StackFilter::MinFortune(level) => stack.fortune >= *level,
            StackFilter::ExcludeTier(tier) => stack.item.tier() != Some(*tier),
        }
    }
}

/// One key in a selection's sort order. Earlier keys dominate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StackSort {
    /// Stacks that yield a drop first.
    CanHarvest(BlockState),
    /// Faster breaking first.
    BreakDelta(BlockState),
    /// The agent's selected hotbar slot first.
    SelectedSlot,
}

impl StackSort {
    fn compare(&self, a: &ItemStack, b: &ItemStack, agent: &Agent) -> Ordering {
        match self {
            StackSort::CanHarvest(state) => b.item.can_harvest(state).cmp(&a.item.can_harvest(state)),
            StackSort::BreakDelta(state) => {
                let da = item::break_delta(state, a, agent);
                let db = item::break_delta(state, b, agent);
                db.total_cmp(&da)
            }
            StackSort::SelectedSlot => {
                let selected = agent.inventory.selected_slot;
                (b.slot == selected).cmp(&(a.slot == selected))
            }
        }
    }
}

/// What stack the planner wants, and how many of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackSelection {
    pub filters: Vec<StackFilter>,
    pub sort: Vec<StackSort>,
    /// Minimum total count a container must hold. Zero lets an empty hand
    /// (empty slots have count 0) satisfy the selection.
    pub count: u32,
}

impl StackSelection {
    /// Any stack, including empty slots.
    pub fn everything() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            count: 0,
        }
    }

    /// Exactly `item`. Asking for the empty hand asks for an empty slot.
    pub fn of_item(item: Item) -> Self {
        Self {
            filters: vec![StackFilter::Item(item)],
            sort: Vec::new(),
            count: if item.is_empty() { 0 } else { 1 },
        }
    }

    pub fn filter(mut self, filter: StackFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Append `filter` only when `cond` holds.
    pub fn filter_if(self, cond: bool, filter: StackFilter) -> Self {
        if cond { self.filter(filter) } else { self }
    }

    pub fn sort_by(mut self, key: StackSort) -> Self {
        self.sort.push(key);
        self
    }

    pub fn matches(&self, stack: &ItemStack) -> bool {
        self.filters.iter().all(|f| f.accepts(stack))
    }

    pub fn compare(&self, a: &ItemStack, b: &ItemStack, agent: &Agent) -> Ordering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b, agent))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// The stacks from `stacks` that pass the filters, best first. Stable,
    /// so equal stacks keep slot order.
    pub fn filter_stacks<'a>(
        &self,
        stacks: impl IntoIterator<Item = &'a ItemStack>,
        agent: &Agent,
    ) -> Vec<&'a ItemStack> {
        let mut out: Vec<&ItemStack> = stacks.into_iter().filter(|s| self.matches(s)).collect();
        out.sort_by(|a, b| self.compare(a, b, agent));
        out
    }

    /// The item this selection asks for, if it names exactly one.
    pub fn wanted_item(&self) -> Option<Item> {
        self.filters.iter().find_map(|f| match f {
            StackFilter::Item(item) => Some(*item),
            _ => None,
        })
    }
}

impl fmt::Display for StackSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wanted_item() {
            Some(item) => write!(f, "{} x{}", item, self.count),
            None if self.filters.is_empty() => f.write_str("anything"),
            None => write!(f, "stack matching {} filters", self.filters.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Where a stack lives, in provider priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerRank {
    MainHand,
    OffHand,
    Hotbar,
    Inventory,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContainerSelection {
    #[default]
    Any,
    OfAnyType(Vec<ContainerRank>),
}

impl ContainerSelection {
    pub fn hotbar() -> Self {
        ContainerSelection::OfAnyType(vec![ContainerRank::Hotbar])
    }

    pub fn matches(&self, rank: ContainerRank) -> bool {
        match self {
            ContainerSelection::Any => true,
            ContainerSelection::OfAnyType(ranks) => ranks.contains(&rank),
        }
    }
}

/// A view of one container's stacks.
#[derive(Clone, Debug)]
pub struct MaterialContainer<'a> {
    pub rank: ContainerRank,
    pub stacks: Vec<&'a ItemStack>,
}

impl<'a> MaterialContainer<'a> {
    pub fn matching_stacks(&self, selection: &StackSelection) -> Vec<&'a ItemStack> {
        self.stacks
            .iter()
            .copied()
            .filter(|s| selection.matches(s))
            .collect()
    }

    pub fn material_available(&self, selection: &StackSelection) -> u32 {
        self.matching_stacks(selection).iter().map(|s| s.count).sum()
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// The agent's slots. Every slot always holds a stack; empty slots hold
/// `Item::Empty` with count 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
    pub selected_slot: u8,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {
    pub fn new() -> Self {
        let slots = (0..=OFFHAND_SLOT).map(ItemStack::empty).collect();
        Self {
            slots,
            selected_slot: 0,
        }
    }

    /// Put `stack` into the slot it names, replacing what was there.
    /// Slots outside the inventory are ignored.
    pub fn insert(&mut self, stack: ItemStack) {
        if let Some(slot) = self.slots.get_mut(stack.slot as usize) {
            *slot = stack;
        }
    }

    /// Builder-style `insert`.
    pub fn with(mut self, stack: ItemStack) -> Self {
        self.insert(stack);
        self
    }

    pub fn stack(&self, slot: u8) -> Option<&ItemStack> {
        self.slots.get(slot as usize)
    }

    pub fn main_hand(&self) -> &ItemStack {
        &self.slots[self.selected_slot.min(HOTBAR_SIZE - 1) as usize]
    }

    pub fn offhand(&self) -> &ItemStack {
        &self.slots[OFFHAND_SLOT as usize]
    }

    pub fn hotbar(&self) -> &[ItemStack] {
        &self.slots[..HOTBAR_SIZE as usize]
    }

    /// Non-empty stacks in slot order.
    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().filter(|s| !s.is_empty())
    }

    /// Every container, in provider priority order.
    pub fn containers(&self) -> Vec<MaterialContainer<'_>> {
        vec![
            MaterialContainer {
                rank: ContainerRank::MainHand,
                stacks: vec![self.main_hand()],
            },
            MaterialContainer {
                rank: ContainerRank::OffHand,
                stacks: vec![self.offhand()],
            },
            MaterialContainer {
                rank: ContainerRank::Hotbar,
                stacks: self.hotbar().iter().collect(),
            },
            MaterialContainer {
                rank: ContainerRank::Inventory,
                stacks: self.slots[HOTBAR_SIZE as usize..MAIN_END as usize].iter().collect(),
            },
        ]
    }

    /// Containers allowed by `containers` that hold at least
    /// `selection.count` of matching material, best provider first.
    pub fn find_containers_with_material(
        &self,
        selection: &StackSelection,
        containers: &ContainerSelection,
    ) -> Vec<MaterialContainer<'_>> {
        self.containers()
            .into_iter()
            .filter(|c| containers.matches(c.rank))
            .filter(|c| !c.matching_stacks(selection).is_empty())
            .filter(|c| c.material_available(selection) >= selection.count)
            .collect()
    }

    /// The best stack for `selection` anywhere in the inventory.
    pub fn select_stack<'a>(&'a self, selection: &StackSelection, agent: &Agent) -> Option<&'a ItemStack> {
        let candidates = self.slots[..MAIN_END as usize]
            .iter()
            .chain(std::iter::once(self.offhand()));
        selection.filter_stacks(candidates, agent).into_iter().next()
    }
}
