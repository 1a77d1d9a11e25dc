//! Shared build context for one stage invocation
//!
//! The three category builders write into a single [`StageContext`] instead
//! of an ambient global model: variables and constraints are registered
//! through it, and objective terms accumulate into one additive total.
//! Accumulation is plain expression addition, so the builders can run in any
//! order.

use good_lp::{Constraint, Expression, ProblemVariables, Variable, VariableDefinition};

/// Registry of variables, constraints, and the additive objective for one
/// stage's model. Construction is single-threaded and side-effect-free
/// outside this object; every stage invocation starts from an empty context.
pub struct StageContext {
    variables: ProblemVariables,
    constraints: Vec<Constraint>,
    objective: Expression,
    num_variables: usize,
}

impl StageContext {
    pub fn new() -> Self {
        Self {
            variables: ProblemVariables::new(),
            constraints: Vec::new(),
            objective: Expression::from(0.0),
            num_variables: 0,
        }
    }

    /// Register a decision variable
    pub fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        self.num_variables += 1;
        self.variables.add(definition)
    }

    /// Register a constraint
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Add a term to the shared objective total
    pub fn add_objective(&mut self, term: Expression) {
        self.objective += term;
    }

    /// Number of variables registered so far
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Number of constraints registered so far
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The accumulated objective
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Release the underlying LP pieces for handoff to a solver backend.
    pub fn into_parts(self) -> (ProblemVariables, Expression, Vec<Constraint>) {
        (self.variables, self.objective, self.constraints)
    }
}

impl Default for StageContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use good_lp::solvers::clarabel::clarabel;
    use good_lp::{constraint, variable, Solution, SolverModel};

    #[test]
    fn counts_registrations() {
        let mut ctx = StageContext::new();
        let a = ctx.add_variable(variable().min(0.0));
        let b = ctx.add_variable(variable().min(0.0));
        ctx.add_constraint(constraint!(a + b <= 10.0));
        assert_eq!(ctx.num_variables(), 2);
        assert_eq!(ctx.num_constraints(), 1);
    }

    #[test]
    fn accumulated_objective_reaches_the_solver() {
        let mut ctx = StageContext::new();
        let a = ctx.add_variable(variable().min(0.0));
        let b = ctx.add_variable(variable().min(0.0));
        ctx.add_objective(2.0 * a);
        ctx.add_objective(3.0 * b);
        ctx.add_constraint(constraint!(a >= 1.0));
        ctx.add_constraint(constraint!(b >= 2.0));

        let (vars, objective, constraints) = ctx.into_parts();
        let mut model = vars.minimise(objective.clone()).using(clarabel);
        for c in constraints {
            model = model.with(c);
        }
        let solution = model.solve().expect("feasible toy model");
        assert!((solution.value(a) - 1.0).abs() < 1e-6);
        assert!((solution.value(b) - 2.0).abs() < 1e-6);
        assert!((solution.eval(objective) - 8.0).abs() < 1e-5);
    }
}
