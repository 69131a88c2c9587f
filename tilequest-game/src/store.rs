//! Merchant stock, prices and purchases.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combat::{SPELLS, spell};
use crate::constants::{GEAR_PRICE_PER_BONUS, POTION_ITEM, POTION_PRICE, SHOP_MAX_SPELLS};
use crate::player::{Armor, Player, Weapon, armor_pool, weapon_pool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Spell,
    Weapon,
    Armor,
    Potion,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spell => "spell",
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Potion => "potion",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub kind: ItemKind,
    pub price: i32,
}

/// Gold price of a spell, if it is for sale at all.
#[must_use]
pub fn spell_price(name: &str) -> Option<i32> {
    let price = match name {
        "Firebolt" => 25,
        "Heal" | "Guard Break" => 30,
        "Ice Shard" => 45,
        "Shock" => 40,
        "Regen" => 35,
        _ => return None,
    };
    Some(price)
}

#[must_use]
pub const fn gear_price(bonus: i32) -> i32 {
    bonus * GEAR_PRICE_PER_BONUS
}

/// Outcome of a purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purchase {
    Bought(ShopItem),
    NotStocked,
    NotEnoughGold,
}

impl Purchase {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Bought(item) => format!("You acquire the {} {}!", item.kind, item.name),
            Self::NotStocked => "The merchant shrugs. 'I don't have that.'".to_string(),
            Self::NotEnoughGold => "You don't have enough gold.".to_string(),
        }
    }
}

/// Stock of a single merchant tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    items: Vec<ShopItem>,
}

impl Shop {
    /// Roll fresh stock: up to three spells the player lacks, one weapon, one
    /// armor, and potions.
    pub fn generate<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> Self {
        let unknown: Vec<&str> = SPELLS
            .iter()
            .map(|spell| spell.name)
            .filter(|name| !player.knows_spell(name) && spell_price(name).is_some())
            .collect();
        let mut spells: Vec<&str> = Vec::new();
        for _ in 0..SHOP_MAX_SPELLS.min(unknown.len()) {
            if let Some(name) = unknown.choose(rng)
                && !spells.contains(name)
            {
                spells.push(*name);
            }
        }

        let mut items: Vec<ShopItem> = spells
            .into_iter()
            .filter_map(|name| {
                spell_price(name).map(|price| ShopItem {
                    name: name.to_string(),
                    kind: ItemKind::Spell,
                    price,
                })
            })
            .collect();
        if let Some(weapon) = weapon_pool().choose(rng) {
            items.push(ShopItem {
                name: weapon.name.clone(),
                kind: ItemKind::Weapon,
                price: gear_price(weapon.attack_bonus),
            });
        }
        if let Some(armor) = armor_pool().choose(rng) {
            items.push(ShopItem {
                name: armor.name.clone(),
                kind: ItemKind::Armor,
                price: gear_price(armor.defense_bonus),
            });
        }
        items.push(potion_item());
        Self { items }
    }

    #[must_use]
    pub fn from_items(items: Vec<ShopItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[ShopItem] {
        &self.items
    }

    /// Drop stock the player can no longer use: known spells and the gear
    /// already equipped.
    pub fn prune(&mut self, player: &Player) {
        self.items.retain(|item| match item.kind {
            ItemKind::Spell => !player.knows_spell(&item.name),
            ItemKind::Weapon => player.weapon.as_ref().is_none_or(|w| w.name != item.name),
            ItemKind::Armor => player.armor.as_ref().is_none_or(|a| a.name != item.name),
            ItemKind::Potion => true,
        });
    }

    /// Numbered listing shown on entry and on `look`.
    #[must_use]
    pub fn listing(&self, player: &Player) -> String {
        let mut lines = vec!["\nMerchant's Caravan - Items for sale:".to_string()];
        for (idx, item) in self.items.iter().enumerate() {
            let number = idx + 1;
            let line = match item.kind {
                ItemKind::Spell => {
                    let mp = spell(&item.name).map_or(0, |s| s.mp);
                    format!("  {number}. {} (Spell) - {}g (MP {mp})", item.name, item.price)
                }
                ItemKind::Weapon => format!("  {number}. {} (Weapon) - {}g", item.name, item.price),
                ItemKind::Armor => format!("  {number}. {} (Armor) - {}g", item.name, item.price),
                ItemKind::Potion => {
                    format!("  {number}. {} - {}g (Restores HP)", item.name, item.price)
                }
            };
            lines.push(line);
        }
        lines.push(format!("Player gold: {}", player.gold));
        lines.push("Type a number or item name to buy.".to_string());
        lines.join("\n")
    }

    /// Resolve a 1-based index or a case-insensitive item name.
    #[must_use]
    pub fn find(&self, selection: &str) -> Option<&ShopItem> {
        let selection = selection.trim();
        if !selection.is_empty() && selection.chars().all(|c| c.is_ascii_digit()) {
            return selection
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| self.items.get(idx));
        }
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(selection))
    }

    /// Buy an item, applying it to the player and pruning the stock.
    pub fn buy(&mut self, selection: &str, player: &mut Player) -> Purchase {
        let Some(item) = self.find(selection).cloned() else {
            return Purchase::NotStocked;
        };
        if player.gold < item.price {
            return Purchase::NotEnoughGold;
        }
        player.gold -= item.price;
        match item.kind {
            ItemKind::Spell => player.known_spells.push(item.name.clone()),
            ItemKind::Weapon => player.weapon = Some(weapon_named(&item.name, item.price)),
            ItemKind::Armor => player.armor = Some(armor_named(&item.name, item.price)),
            ItemKind::Potion => player.potions += 1,
        }
        self.prune(player);
        Purchase::Bought(item)
    }
}

fn potion_item() -> ShopItem {
    ShopItem {
        name: POTION_ITEM.to_string(),
        kind: ItemKind::Potion,
        price: POTION_PRICE,
    }
}

fn weapon_named(name: &str, price: i32) -> Weapon {
    weapon_pool()
        .into_iter()
        .find(|w| w.name == name)
        .unwrap_or_else(|| Weapon::new(name, price / GEAR_PRICE_PER_BONUS))
}

fn armor_named(name: &str, price: i32) -> Armor {
    armor_pool()
        .into_iter()
        .find(|a| a.name == name)
        .unwrap_or_else(|| Armor::new(name, price / GEAR_PRICE_PER_BONUS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngBundle;

    fn fixed_shop() -> Shop {
        Shop::from_items(vec![
            ShopItem {
                name: "Firebolt".to_string(),
                kind: ItemKind::Spell,
                price: 25,
            },
            ShopItem {
                name: "Iron Sword".to_string(),
                kind: ItemKind::Weapon,
                price: 60,
            },
            ShopItem {
                name: "Chain Mail".to_string(),
                kind: ItemKind::Armor,
                price: 60,
            },
            potion_item(),
        ])
    }

    #[test]
    fn generated_stock_skips_known_spells() {
        let mut player = Player::new_hero();
        player.known_spells = vec!["Firebolt".to_string(), "Heal".to_string()];
        let mut rng = RngBundle::from_user_seed(3);
        for _ in 0..50 {
            let shop = Shop::generate(&player, rng.loot());
            let spells: Vec<_> = shop
                .items()
                .iter()
                .filter(|i| i.kind == ItemKind::Spell)
                .collect();
            assert!(spells.len() <= 3);
            assert!(spells.iter().all(|s| !player.knows_spell(&s.name)));
            assert_eq!(shop.items().last().map(|i| i.kind), Some(ItemKind::Potion));
            assert_eq!(shop.items().iter().filter(|i| i.kind == ItemKind::Weapon).count(), 1);
            assert_eq!(shop.items().iter().filter(|i| i.kind == ItemKind::Armor).count(), 1);
        }
    }

    #[test]
    fn listing_numbers_each_item() {
        let shop = fixed_shop();
        let listing = shop.listing(&Player::new_hero());
        assert!(listing.contains("1. Firebolt (Spell) - 25g (MP 4)"));
        assert!(listing.contains("2. Iron Sword (Weapon) - 60g"));
        assert!(listing.contains("4. Potion - 5g (Restores HP)"));
        assert!(listing.contains("Player gold: 50"));
    }

    #[test]
    fn buy_by_index_and_name() {
        let mut shop = fixed_shop();
        let mut player = Player::new_hero();
        player.gold = 200;
        assert_eq!(
            shop.buy("1", &mut player).message(),
            "You acquire the spell Firebolt!"
        );
        assert!(player.knows_spell("Firebolt"));
        assert_eq!(shop.items().len(), 3);
        assert_eq!(
            shop.buy("iron sword", &mut player).message(),
            "You acquire the weapon Iron Sword!"
        );
        assert_eq!(player.weapon, Some(Weapon::new("Iron Sword", 3)));
        assert_eq!(player.gold, 115);
        assert!(shop.find("Iron Sword").is_none());
    }

    #[test]
    fn refusals_leave_player_untouched() {
        let mut shop = fixed_shop();
        let mut player = Player::new_hero();
        player.gold = 10;
        assert_eq!(shop.buy("Chain Mail", &mut player), Purchase::NotEnoughGold);
        assert_eq!(shop.buy("99", &mut player), Purchase::NotStocked);
        assert_eq!(shop.buy("Excalibur", &mut player), Purchase::NotStocked);
        assert_eq!(player.gold, 10);
        assert_eq!(shop.buy("potion", &mut player), Purchase::Bought(potion_item()));
        assert_eq!(player.potions, 2);
        assert_eq!(player.gold, 5);
    }

    #[test]
    fn prune_hides_equipped_gear() {
        let mut shop = fixed_shop();
        let mut player = Player::new_hero();
        player.armor = Some(Armor::new("Chain Mail", 3));
        shop.prune(&player);
        assert!(shop.find("Chain Mail").is_none());
        assert!(shop.find("Potion").is_some());
    }

    #[test]
    fn prices_follow_the_table() {
        assert_eq!(spell_price("Ice Shard"), Some(45));
        assert_eq!(spell_price("Guard Break"), Some(30));
        assert_eq!(spell_price("Meteor"), None);
        assert_eq!(gear_price(5), 100);
    }
}
