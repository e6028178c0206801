//! Built-in analytical reports over the storefront schema, in MySQL dialect.

pub(crate) const STOREFRONT_REPORTS: [(&str, &str); 20] = [
    (
        "Customer payments listed alphabetically",
        "SELECT c.name, p.amount, p.payment_date \
         FROM payments p \
         JOIN orders o ON p.order_id = o.order_id \
         JOIN customers c ON o.customer_id = c.customer_id \
         ORDER BY c.name",
    ),
    (
        "Customers who registered within the past year",
        "SELECT customer_id, name, email, phone, address, registration_date \
         FROM customers \
         WHERE registration_date >= CURDATE() - INTERVAL 1 YEAR",
    ),
    (
        "Orders and payment details",
        "SELECT o.order_id, o.order_date, o.total_amount, p.payment_method, p.amount \
         FROM orders o \
         LEFT JOIN payments p ON o.order_id = p.order_id",
    ),
    (
        "Products priced between $10 and $100",
        "SELECT product_name, price \
         FROM products \
         WHERE price BETWEEN 10 AND 100",
    ),
    (
        "Products and their category names",
        "SELECT p.product_name, c.category_name \
         FROM products p \
         JOIN categories c ON p.category_id = c.category_id",
    ),
    (
        "Total quantity of all products in stock",
        "SELECT SUM(COALESCE(stock_quantity, 0)) AS total_stock \
         FROM products",
    ),
    (
        "Total value of unsold stock for each category",
        "SELECT c.category_name, SUM(p.stock_quantity * p.price) AS total_stock_value \
         FROM products p \
         JOIN categories c ON p.category_id = c.category_id \
         GROUP BY c.category_name",
    ),
    (
        "Annual revenue for each product category",
        "SELECT c.category_name, YEAR(o.order_date) AS year, SUM(o.total_amount) AS annual_revenue \
         FROM orders o \
         JOIN orderdetails od ON o.order_id = od.order_id \
         JOIN products p ON od.product_id = p.product_id \
         JOIN categories c ON p.category_id = c.category_id \
         GROUP BY c.category_name, year",
    ),
    (
        "Customers ranked by total spending, average order value and number of orders",
        "SELECT c.customer_id, c.name, SUM(o.total_amount) AS total_spending, \
         COUNT(o.order_id) AS total_orders, AVG(o.total_amount) AS avg_order_value \
         FROM orders o \
         JOIN customers c ON o.customer_id = c.customer_id \
         GROUP BY c.customer_id, c.name \
         ORDER BY total_spending DESC",
    ),
    (
        "Customers at risk of churn",
        "SELECT c.customer_id, c.name, MAX(o.order_date) AS last_order_date, \
         DATEDIFF(CURDATE(), MAX(o.order_date)) AS days_since_last_order \
         FROM orders o \
         JOIN customers c ON o.customer_id = c.customer_id \
         GROUP BY c.customer_id, c.name \
         HAVING days_since_last_order > 180",
    ),
    (
        "Stock reorder quantities",
        "SELECT p.product_name, p.stock_quantity, 60 AS stock_needed, \
         GREATEST(0, 60 - p.stock_quantity) AS reorder_quantity \
         FROM products p",
    ),
    (
        "Products frequently bought together",
        "SELECT p1.product_name AS product1, p2.product_name AS product2, \
         COUNT(*) AS times_bought_together \
         FROM orderdetails od1 \
         JOIN orderdetails od2 ON od1.order_id = od2.order_id AND od1.product_id < od2.product_id \
         JOIN products p1 ON od1.product_id = p1.product_id \
         JOIN products p2 ON od2.product_id = p2.product_id \
         GROUP BY p1.product_name, p2.product_name",
    ),
    (
        "Reorder points based on sales trends",
        "SELECT p.product_name, p.stock_quantity, 10 AS avg_daily_sales, 70 AS reorder_point, \
         CASE WHEN p.stock_quantity >= 70 THEN 'Sufficient Stock' ELSE 'Reorder Needed' END AS stock_status \
         FROM products p",
    ),
    (
        "Revenue contribution by supplier",
        "SELECT s.supplier_name, c.category_name, SUM(p.price * od.quantity) AS total_revenue \
         FROM suppliers s \
         JOIN products p ON s.supplier_id = p.supplier_id \
         JOIN categories c ON p.category_id = c.category_id \
         JOIN orderdetails od ON p.product_id = od.product_id \
         GROUP BY s.supplier_name, c.category_name",
    ),
    (
        "Customers who ordered the same product",
        "SELECT c1.name AS customer1, c2.name AS customer2, p.product_name \
         FROM orders o1 \
         JOIN orders o2 ON o1.order_id <> o2.order_id \
         JOIN orderdetails od1 ON o1.order_id = od1.order_id \
         JOIN orderdetails od2 ON o2.order_id = od2.order_id \
         JOIN customers c1 ON o1.customer_id = c1.customer_id \
         JOIN customers c2 ON o2.customer_id = c2.customer_id \
         JOIN products p ON od1.product_id = od2.product_id \
         GROUP BY c1.name, c2.name, p.product_name \
         LIMIT 10",
    ),
    (
        "Category contribution to sales revenue",
        "SELECT c.category_name, \
         (SUM(o.total_amount) / (SELECT SUM(total_amount) FROM orders)) * 100 AS percentage_contribution \
         FROM orders o \
         JOIN orderdetails od ON o.order_id = od.order_id \
         JOIN products p ON od.product_id = p.product_id \
         JOIN categories c ON p.category_id = c.category_id \
         GROUP BY c.category_name \
         ORDER BY percentage_contribution DESC",
    ),
    (
        "The most popular payment methods",
        "SELECT p.payment_method, COUNT(*) AS usage_count \
         FROM payments p \
         GROUP BY p.payment_method",
    ),
    (
        "Sales report for each product",
        "SELECT p.product_name, c.category_name, SUM(od.quantity) AS total_quantity_sold, \
         SUM(od.quantity * od.price_at_purchase) AS total_revenue \
         FROM products p \
         JOIN categories c ON p.category_id = c.category_id \
         JOIN orderdetails od ON p.product_id = od.product_id \
         GROUP BY p.product_name, c.category_name",
    ),
    (
        "Suppliers with the lowest priced products",
        "SELECT s.supplier_name, p.product_name, p.price \
         FROM products p \
         JOIN suppliers s ON p.supplier_id = s.supplier_id \
         WHERE p.price = (SELECT MIN(price) FROM products)",
    ),
    (
        "The category with the highest revenue",
        "SELECT c.category_name, SUM(o.total_amount) AS total_revenue \
         FROM orders o \
         JOIN orderdetails od ON o.order_id = od.order_id \
         JOIN products p ON od.product_id = p.product_id \
         JOIN categories c ON p.category_id = c.category_id \
         GROUP BY c.category_name \
         ORDER BY total_revenue DESC \
         LIMIT 1",
    ),
];
