/// Demo catalog, category filter and favorites.
use strum::{EnumIter, IntoEnumIterator};

/// Already-present notifications added to the favorites badge.
pub const BADGE_BASE: usize = 2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Category {
  #[default]
  Popular,
  Chaqueta,
  Zapatos,
  Pantalones,
  Accesorios,
}

impl Category {
  pub fn label(&self) -> &'static str {
    match self {
      Category::Popular => "Popular",
      Category::Chaqueta => "Chaquetas",
      Category::Zapatos => "Zapatos",
      Category::Pantalones => "Pantalones",
      Category::Accesorios => "Accesorios",
    }
  }

  pub fn section_title(&self) -> &'static str {
    match self {
      Category::Popular => "Producto Popular",
      other => other.label(),
    }
  }

  pub fn all() -> Vec<Category> {
    Category::iter().collect()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum NavItem {
  Inicio,
  Favoritos,
  Carrito,
  Perfil,
}

impl NavItem {
  pub fn label(&self) -> &'static str {
    match self {
      NavItem::Inicio => "Inicio",
      NavItem::Favoritos => "Favoritos",
      NavItem::Carrito => "Carrito",
      NavItem::Perfil => "Perfil",
    }
  }

  pub fn from_index(index: usize) -> Option<NavItem> {
    NavItem::iter().nth(index)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
  pub name: &'static str,
  pub price: &'static str,
  pub category: Category,
  pub favorite: bool,
}

const CATALOG: &[(&str, &str, Category)] = &[
  ("Chaqueta Denim", "$89", Category::Chaqueta),
  ("Chaqueta Bomber", "$120", Category::Chaqueta),
  ("Zapatillas Urbanas", "$75", Category::Zapatos),
  ("Botas de Cuero", "$140", Category::Zapatos),
  ("Pantalón Cargo", "$59", Category::Pantalones),
  ("Jeans Slim", "$65", Category::Pantalones),
  ("Gorra Clásica", "$25", Category::Accesorios),
  ("Mochila Lona", "$48", Category::Accesorios),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storefront {
  products: Vec<Product>,
  category: Category,
  focused: usize,
}

impl Default for Storefront {
  fn default() -> Self {
    Self::new()
  }
}

impl Storefront {
  pub fn new() -> Self {
    let products = CATALOG
      .iter()
      .map(|&(name, price, category)| Product { name, price, category, favorite: false })
      .collect();
    Self { products, category: Category::default(), focused: 0 }
  }

  pub fn category(&self) -> Category {
    self.category
  }

  /// Switches the active category and puts focus back on the first product.
  pub fn select_category(&mut self, category: Category) {
    self.category = category;
    self.focused = 0;
  }

  pub fn shift_category(&mut self, forward: bool) -> Category {
    let all = Category::all();
    let index = all.iter().position(|c| *c == self.category).unwrap_or(0);
    let next = if forward { (index + 1) % all.len() } else { (index + all.len() - 1) % all.len() };
    self.select_category(all[next]);
    self.category
  }

  /// Popular shows everything.
  pub fn visible(&self) -> Vec<&Product> {
    self.products
      .iter()
      .filter(|p| self.category == Category::Popular || p.category == self.category)
      .collect()
  }

  pub fn focused_index(&self) -> usize {
    self.focused
  }

  pub fn focused(&self) -> Option<&Product> {
    self.visible().get(self.focused).copied()
  }

  pub fn move_focus(&mut self, forward: bool) {
    let count = self.visible().len();
    if count == 0 {
      return;
    }
    self.focused = if forward { (self.focused + 1) % count } else { (self.focused + count - 1) % count };
  }

  /// Flips the favorite on the focused product; `None` when nothing is focused.
  pub fn toggle_favorite(&mut self) -> Option<bool> {
    let name = self.focused()?.name;
    let product = self.products.iter_mut().find(|p| p.name == name)?;
    product.favorite = !product.favorite;
    Some(product.favorite)
  }

  pub fn favorites_count(&self) -> usize {
    self.products.iter().filter(|p| p.favorite).count()
  }

  pub fn badge_count(&self) -> usize {
    self.favorites_count() + BADGE_BASE
  }
}
