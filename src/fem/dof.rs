/// Interleaved DOF numbering with prescribed values
///
/// Node `n`, component `c` maps to `n * dofs_per_node + c`. Each DOF is either
/// free or carries a prescribed value; prescribing it again overwrites it.
#[derive(Debug, Clone)]
pub struct DofManager {
    num_nodes: usize,
    /// 2 for plane displacement
    dofs_per_node: usize,
    prescribed: Vec<Option<f64>>,
    num_constrained: usize,
}

impl DofManager {
    pub fn new(num_nodes: usize, dofs_per_node: usize) -> Self {
        Self {
            num_nodes,
            dofs_per_node,
            prescribed: vec![None; num_nodes * dofs_per_node],
            num_constrained: 0,
        }
    }

    /// Global index of component `local_dof` of `node_id`
    pub fn global_dof(&self, node_id: usize, local_dof: usize) -> usize {
        debug_assert!(node_id < self.num_nodes);
        debug_assert!(local_dof < self.dofs_per_node);
        node_id * self.dofs_per_node + local_dof
    }

    /// Prescribe `value` on a global DOF
    pub fn set_dirichlet(&mut self, dof: usize, value: f64) {
        let slot = &mut self.prescribed[dof];
        if slot.is_none() {
            self.num_constrained += 1;
        }
        *slot = Some(value);
    }

    /// Prescribe every component of a node
    ///
    /// # Arguments
    /// * `node_id` - Node index
    /// * `values` - One value per component
    pub fn set_dirichlet_node(&mut self, node_id: usize, values: &[f64]) {
        debug_assert_eq!(values.len(), self.dofs_per_node);
        for (local_dof, &value) in values.iter().enumerate() {
            let dof = self.global_dof(node_id, local_dof);
            self.set_dirichlet(dof, value);
        }
    }

    pub fn is_dirichlet(&self, dof: usize) -> bool {
        self.prescribed[dof].is_some()
    }

    /// Prescribed value, 0 for free DOFs
    pub fn get_dirichlet_value(&self, dof: usize) -> f64 {
        self.prescribed[dof].unwrap_or(0.0)
    }

    pub fn total_dofs(&self) -> usize {
        self.prescribed.len()
    }

    pub fn num_free_dofs(&self) -> usize {
        self.total_dofs() - self.num_constrained
    }

    pub fn num_constrained_dofs(&self) -> usize {
        self.num_constrained
    }

    pub fn dofs_per_node(&self) -> usize {
        self.dofs_per_node
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_dof_numbering() {
        let dof_mgr = DofManager::new(10, 2);

        assert_eq!(dof_mgr.total_dofs(), 20);

        // Node 0: DOFs 0, 1
        assert_eq!(dof_mgr.global_dof(0, 0), 0);
        assert_eq!(dof_mgr.global_dof(0, 1), 1);

        // Node 4: DOFs 8, 9
        assert_eq!(dof_mgr.global_dof(4, 0), 8);
        assert_eq!(dof_mgr.global_dof(4, 1), 9);
    }

    #[test]
    fn test_dirichlet_bc() {
        let mut dof_mgr = DofManager::new(10, 2);

        assert_eq!(dof_mgr.num_free_dofs(), 20);
        assert_eq!(dof_mgr.num_constrained_dofs(), 0);

        dof_mgr.set_dirichlet(3, 1e-3);

        assert!(dof_mgr.is_dirichlet(3));
        assert!(!dof_mgr.is_dirichlet(2));
        assert_eq!(dof_mgr.get_dirichlet_value(3), 1e-3);
        assert_eq!(dof_mgr.num_free_dofs(), 19);
    }

    #[test]
    fn test_dirichlet_node() {
        let mut dof_mgr = DofManager::new(10, 2);

        dof_mgr.set_dirichlet_node(1, &[0.5, -0.25]);

        assert!(dof_mgr.is_dirichlet(2));
        assert!(dof_mgr.is_dirichlet(3));
        assert!(!dof_mgr.is_dirichlet(4));
        assert_eq!(dof_mgr.get_dirichlet_value(2), 0.5);
        assert_eq!(dof_mgr.get_dirichlet_value(3), -0.25);
        assert_eq!(dof_mgr.num_constrained_dofs(), 2);

        // Re-prescribing the same node does not double count
        dof_mgr.set_dirichlet_node(1, &[0.0, 0.0]);
        assert_eq!(dof_mgr.num_constrained_dofs(), 2);
        assert_eq!(dof_mgr.get_dirichlet_value(2), 0.0);
    }
}
