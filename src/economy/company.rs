//! Companies: collective knowledge, production and payroll

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::types::{CompanyId, Day, PersonId};
use crate::economy::market::Market;
use crate::economy::valuation;
use crate::entity::Person;

/// An employer that turns known primes into commodities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub founder: PersonId,
    pub founded_day: Day,
    /// May go negative, which triggers bankruptcy at maintenance
    pub capital: f64,
    /// Commodity → quantity held, never negative
    pub inventory: BTreeMap<u64, f64>,
    /// Non-owning ids into the person registry
    pub employees: Vec<PersonId>,
    /// Union of every employee's known commodities
    pub knowledge: BTreeSet<u64>,
    /// Output multiplier
    pub efficiency: f64,
}

impl Company {
    pub fn new(id: CompanyId, founder: PersonId, capital: f64, founded_day: Day) -> Self {
        Self {
            id,
            founder,
            founded_day,
            capital,
            inventory: BTreeMap::new(),
            employees: Vec::new(),
            knowledge: BTreeSet::new(),
            efficiency: 1.0,
        }
    }

    /// True for a prime in collective knowledge, or a composite whose prime
    /// factors are all known
    pub fn can_produce(&self, n: u64) -> bool {
        if n == 0 {
            return false;
        }
        if valuation::is_prime(n) {
            return self.knowledge.contains(&n);
        }
        valuation::factorize(n)
            .keys()
            .all(|prime| self.knowledge.contains(prime))
    }

    /// Produce up to `quantity` units of `n`.
    ///
    /// Output is scaled down when capital cannot cover the full cost and
    /// reduced by `entropy_loss`. Returns the amount added to inventory.
    pub fn produce(&mut self, n: u64, quantity: f64, entropy_loss: f64) -> f64 {
        if !self.can_produce(n) || quantity <= 0.0 || self.capital <= 0.0 {
            return 0.0;
        }

        let weight = valuation::weight(n) as f64;
        let mut quantity = quantity;
        let mut cost = weight * quantity;
        if cost > self.capital {
            quantity = self.capital / weight;
            cost = self.capital;
        }

        let produced = quantity * (1.0 - entropy_loss) * self.efficiency;
        self.capital -= cost;
        *self.inventory.entry(n).or_insert(0.0) += produced;
        produced
    }

    /// Take `quantity` out of inventory, returning what was actually available
    pub fn withdraw(&mut self, n: u64, quantity: f64) -> f64 {
        let Some(held) = self.inventory.get_mut(&n) else {
            return 0.0;
        };
        let taken = quantity.min(*held).max(0.0);
        *held -= taken;
        if *held <= 0.0 {
            self.inventory.remove(&n);
        }
        taken
    }

    pub fn stock(&self, n: u64) -> f64 {
        self.inventory.get(&n).copied().unwrap_or(0.0)
    }

    /// Producible commodities in `2..max_product`, best first.
    ///
    /// Ranked by efficiency times current market price; ties prefer the
    /// larger number.
    pub fn ranked_products(&self, market: &Market, max_product: u64) -> Vec<(u64, f64)> {
        let mut ranked: Vec<(u64, f64)> = (2..max_product)
            .filter(|&n| self.can_produce(n))
            .map(|n| (n, valuation::efficiency(n) * market.get_price(n)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| b.0.cmp(&a.0)));
        ranked
    }

    pub fn best_product(&self, market: &Market, max_product: u64) -> Option<u64> {
        self.ranked_products(market, max_product)
            .first()
            .map(|&(n, _)| n)
    }

    pub fn employs(&self, person: PersonId) -> bool {
        self.employees.contains(&person)
    }

    pub fn is_full(&self, max_employees: usize) -> bool {
        self.employees.len() >= max_employees
    }

    /// Commodities the candidate knows that the company does not
    pub fn knowledge_gap(&self, candidate: &Person) -> usize {
        candidate.known.difference(&self.knowledge).count()
    }

    /// Add an employee and set their back-reference.
    ///
    /// Callers must release the person from any previous employer first.
    pub fn add_employee(&mut self, person: &mut Person, salary: f64) {
        if !self.employs(person.id) {
            self.employees.push(person.id);
        }
        person.employer = Some(self.id);
        person.salary = salary;
        self.knowledge.extend(person.known.iter().copied());
    }

    /// Drop an employee id and rebuild knowledge from those who remain
    pub fn remove_employee(&mut self, id: PersonId, people: &BTreeMap<PersonId, Person>) -> bool {
        let before = self.employees.len();
        self.employees.retain(|&e| e != id);
        let removed = self.employees.len() != before;
        if removed {
            self.recompute_knowledge(people);
        }
        removed
    }

    /// Rebuild collective knowledge from current employees that still exist
    pub fn recompute_knowledge(&mut self, people: &BTreeMap<PersonId, Person>) {
        self.knowledge = self
            .employees
            .iter()
            .filter_map(|id| people.get(id))
            .flat_map(|p| p.known.iter().copied())
            .collect();
    }

    pub fn payroll(&self, people: &BTreeMap<PersonId, Person>) -> f64 {
        self.employees
            .iter()
            .filter_map(|id| people.get(id))
            .map(|p| p.salary)
            .sum()
    }

    /// Pay every employee, or go bankrupt if capital cannot cover payroll.
    ///
    /// Returns false on bankruptcy.
    pub fn pay_salaries(&mut self, people: &mut BTreeMap<PersonId, Person>) -> bool {
        let total = self.payroll(people);
        if self.capital < total {
            self.bankruptcy(people);
            return false;
        }

        self.capital -= total;
        for id in &self.employees {
            if let Some(person) = people.get_mut(id) {
                person.resources += person.salary;
            }
        }
        true
    }

    /// Release every employee and zero capital and inventory
    pub fn bankruptcy(&mut self, people: &mut BTreeMap<PersonId, Person>) {
        tracing::info!(company = %self.id, employees = self.employees.len(), "Company went bankrupt");

        for id in self.employees.drain(..) {
            if let Some(person) = people.get_mut(&id) {
                if person.employer == Some(self.id) {
                    person.employer = None;
                    person.salary = 0.0;
                }
            }
        }
        self.knowledge.clear();
        self.capital = 0.0;
        self.inventory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Location;
    use crate::entity::Traits;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn person(id: u64, known: &[u64]) -> Person {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(id);
        let mut p = Person::new(
            PersonId(id),
            Traits::default(),
            Location::new(0, 0, 0, 0),
            &config,
            &mut rng,
        );
        p.known = known.iter().copied().collect();
        p
    }

    fn company_with(capital: f64, knowledge: &[u64]) -> Company {
        let mut company = Company::new(CompanyId(1), PersonId(1), capital, 0);
        company.knowledge = knowledge.iter().copied().collect();
        company
    }

    #[test]
    fn test_can_produce_needs_all_factors() {
        let company = company_with(100.0, &[2, 3]);
        assert!(company.can_produce(2));
        assert!(company.can_produce(6));
        assert!(company.can_produce(12));
        assert!(!company.can_produce(5));
        assert!(!company.can_produce(10));
    }

    #[test]
    fn test_produce_applies_entropy_and_debits_cost() {
        let mut company = company_with(1000.0, &[2]);
        let produced = company.produce(4, 10.0, 0.05);
        assert!((produced - 9.5).abs() < 1e-12);
        assert_eq!(company.capital, 960.0);
        assert_eq!(company.stock(4), produced);
    }

    #[test]
    fn test_produce_caps_quantity_to_capital() {
        let mut company = company_with(20.0, &[2]);
        let produced = company.produce(4, 10.0, 0.0);
        assert_eq!(produced, 5.0);
        assert_eq!(company.capital, 0.0);
    }

    #[test]
    fn test_produce_unknown_is_zero() {
        let mut company = company_with(1000.0, &[2]);
        assert_eq!(company.produce(3, 10.0, 0.05), 0.0);
        assert_eq!(company.capital, 1000.0);
    }

    #[test]
    fn test_hire_and_fire_maintain_knowledge() {
        let mut people = BTreeMap::new();
        let mut alice = person(1, &[2, 3]);
        let mut bob = person(2, &[2, 3, 5, 7]);

        let mut company = Company::new(CompanyId(1), PersonId(1), 1000.0, 0);
        company.add_employee(&mut alice, 0.0);
        company.add_employee(&mut bob, 20.0);
        assert_eq!(bob.employer, Some(CompanyId(1)));
        assert!(company.can_produce(7));

        people.insert(alice.id, alice);
        people.insert(bob.id, bob);

        assert!(company.remove_employee(PersonId(2), &people));
        assert!(!company.can_produce(7));
        assert_eq!(company.knowledge, BTreeSet::from([2, 3]));
    }

    #[test]
    fn test_pay_salaries_credits_employees() {
        let mut people = BTreeMap::new();
        let mut worker = person(1, &[2]);
        let mut company = Company::new(CompanyId(1), PersonId(1), 100.0, 0);
        company.add_employee(&mut worker, 30.0);
        people.insert(worker.id, worker);

        assert!(company.pay_salaries(&mut people));
        assert_eq!(company.capital, 70.0);
        assert_eq!(people[&PersonId(1)].resources, 130.0);
    }

    #[test]
    fn test_unpaid_salaries_bankrupt_company() {
        let mut people = BTreeMap::new();
        let mut worker = person(1, &[2]);
        let mut company = Company::new(CompanyId(1), PersonId(1), 10.0, 0);
        company.add_employee(&mut worker, 30.0);
        company.inventory.insert(2, 5.0);
        people.insert(worker.id, worker);

        assert!(!company.pay_salaries(&mut people));
        assert!(company.employees.is_empty());
        assert!(company.inventory.is_empty());
        assert_eq!(company.capital, 0.0);
        assert_eq!(people[&PersonId(1)].employer, None);
        assert_eq!(people[&PersonId(1)].salary, 0.0);
    }

    #[test]
    fn test_ranked_products_prefers_efficiency_times_price() {
        let company = company_with(1000.0, &[2, 3]);
        let market = Market::default();
        let ranked = company.ranked_products(&market, 20);

        assert!(ranked.iter().all(|&(n, _)| company.can_produce(n)));
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(company.best_product(&market, 20), Some(ranked[0].0));
    }

    #[test]
    fn test_knowledge_gap() {
        let company = company_with(0.0, &[2, 3]);
        let candidate = person(5, &[2, 3, 5, 7]);
        assert_eq!(company.knowledge_gap(&candidate), 2);
    }

    #[test]
    fn test_withdraw_never_goes_negative() {
        let mut company = company_with(0.0, &[2]);
        company.inventory.insert(2, 3.0);
        assert_eq!(company.withdraw(2, 5.0), 3.0);
        assert_eq!(company.stock(2), 0.0);
        assert_eq!(company.withdraw(2, 1.0), 0.0);
    }
}
